//! lazyxml - Lazy, memoizing XML trees over a pull event stream
//!
//! Layers:
//! core: byte scanning, tokenizing, attributes, entities, encodings
//! reader: tokens to events, namespace resolution, event sources
//! dom: the lazy tree (event arena, memo sequences, nodes, documents)
//!
//! ```
//! use lazyxml::Document;
//!
//! let doc = Document::parse_str("<a>x<b/>y</a>")?;
//! let root = doc.root();
//! assert_eq!(root.children().get(1)?.as_element().map(|b| b.local_name()), Some("b"));
//! assert_eq!(root.children().len()?, 3);
//! assert_eq!(doc.to_string(), "<a>x<b/>y</a>");
//! # Ok::<(), lazyxml::Error>(())
//! ```

mod config;
mod core;
mod dom;
mod error;
mod reader;

// ============================================================================
// Public API
// ============================================================================

pub use config::{ReaderConfig, DEFAULT_MAX_DEPTH};
pub use dom::{
    Cursor, Document, Element, EventStream, MemoLazySequence, Node, NodeSequence, Step, Text,
};
pub use error::{Error, Result};
pub use reader::event_reader::{read_events, EventReader};
pub use reader::events::{Event, EventKind, StartElement};
pub use reader::source::{EventSource, IterSource};

/// Iterators handed out by the lazy sequences
pub mod iter {
    pub use crate::dom::memo::Iter as MemoIter;
    pub use crate::dom::sequence::Iter as NodeIter;
}
