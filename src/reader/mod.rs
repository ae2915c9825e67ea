//! XML Reader Module
//!
//! - Events: the event vocabulary consumed by the lazy tree
//! - EventReader: tokens to events, with namespace resolution
//! - EventSource: pull interface over readers and pre-built event lists
//! - Buffered: `Read` sources to UTF-8 buffers

pub mod buffered;
pub mod event_reader;
pub mod events;
pub mod namespace;
pub mod source;
