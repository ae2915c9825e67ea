//! DOM Module - Lazy XML tree
//!
//! A tree over a pull event stream where nothing below the root is read
//! until asked for:
//! - EventStream: read-once event arena addressed by integer cursors
//! - MemoLazySequence: seed + step sequence, each element computed once
//! - Node: element and text views over event spans
//! - NodeSequence: sibling runs built on MemoLazySequence
//! - Document: builders over strings, bytes, readers and event lists

pub mod document;
pub mod memo;
pub mod node;
mod render;
pub mod sequence;
pub mod stream;

pub use document::Document;
pub use memo::{MemoLazySequence, Step};
pub use node::{Element, Node, Text};
pub use sequence::NodeSequence;
pub use stream::{Cursor, EventStream};
