//! Lazy XML Document
//!
//! Entry point: wraps an event source in an [`EventStream`] and reads the
//! root element's start event. Everything below the root is read on demand.

use super::node::{Element, Node};
use super::stream::{Cursor, EventStream};
use crate::config::{ReaderConfig, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};
use crate::reader::buffered::read_all;
use crate::reader::event_reader::EventReader;
use crate::reader::events::{Event, EventKind};
use crate::reader::source::{EventSource, IterSource};
use std::fmt;
use std::io::Read;
use std::sync::Arc;

/// A lazily materialized XML document
#[derive(Clone)]
pub struct Document {
    stream: Arc<EventStream>,
    root: Element,
}

impl Document {
    /// Build a document over any event source. Reads exactly one event,
    /// which must start the root element.
    pub fn from_source<S: EventSource + 'static>(source: S) -> Result<Self> {
        Self::from_source_with(source, DEFAULT_MAX_DEPTH)
    }

    /// As [`from_source`](Self::from_source), refusing nesting deeper than
    /// `max_depth`
    pub fn from_source_with<S: EventSource + 'static>(source: S, max_depth: usize) -> Result<Self> {
        let stream = Arc::new(EventStream::with_max_depth(source, max_depth));
        let root = Element::parse(&stream, 0)?;
        tracing::debug!(root = %root.name(), "document opened");
        Ok(Document { stream, root })
    }

    pub fn parse_str(input: &str) -> Result<Self> {
        Self::parse_str_with(input, ReaderConfig::default())
    }

    pub fn parse_str_with(input: &str, config: ReaderConfig) -> Result<Self> {
        Self::from_source_with(EventReader::new(input, config), config.max_depth)
    }

    /// Parse bytes in UTF-8 or UTF-16 (detected from BOM or first characters)
    pub fn parse_bytes(input: impl Into<Vec<u8>>) -> Result<Self> {
        Self::parse_bytes_with(input, ReaderConfig::default())
    }

    pub fn parse_bytes_with(input: impl Into<Vec<u8>>, config: ReaderConfig) -> Result<Self> {
        Self::from_source_with(EventReader::from_bytes(input.into(), config)?, config.max_depth)
    }

    /// Drain `reader` into memory, then parse lazily from the buffer
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with(reader, ReaderConfig::default())
    }

    pub fn from_reader_with<R: Read>(reader: R, config: ReaderConfig) -> Result<Self> {
        // read_all already normalized the encoding
        Self::from_source_with(EventReader::from_utf8(read_all(reader)?, config), config.max_depth)
    }

    /// Build from pre-made events; running out of events reads as
    /// `StreamEnd`
    pub fn from_events<I>(events: I) -> Result<Self>
    where
        I: IntoIterator<Item = Event>,
        I::IntoIter: Send + 'static,
    {
        Self::from_source(IterSource::new(events.into_iter().map(Ok)))
    }

    /// The root element
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The root as a [`Node`]
    pub fn root_node(&self) -> Node {
        Node::Element(self.root.clone())
    }

    pub fn stream(&self) -> &Arc<EventStream> {
        &self.stream
    }

    /// Cursor just past the root's end event; forces the whole tree
    pub fn end_of_span(&self) -> Result<Cursor> {
        self.root.end_of_span()
    }

    /// Number of events in the document, excluding `StreamEnd`.
    ///
    /// Forces the whole tree and checks nothing follows the root.
    pub fn event_count(&self) -> Result<usize> {
        let end = self.end_of_span()?;
        match self.stream.event_at(end)? {
            Event::StreamEnd => {
                tracing::debug!(events = end, "document fully materialized");
                Ok(end)
            }
            other => Err(Error::UnexpectedEvent {
                position: end,
                expected: EventKind::StreamEnd,
                found: other.kind(),
            }),
        }
    }

    /// Render the whole document, forcing it
    pub fn render(&self) -> Result<String> {
        self.root.render()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("stream", &self.stream)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_reads_one_event() {
        let doc = Document::parse_str("<a><b/><c>t</c></a>").unwrap();
        assert_eq!(doc.stream().pulled(), 1);
        assert_eq!(doc.root().name(), "a");
        assert_eq!(doc.event_count().unwrap(), 7);
    }

    #[test]
    fn test_empty_document() {
        let err = Document::parse_str("  <!-- nothing -->  ").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEvent { position: 0, expected: EventKind::ElementStart, found: EventKind::StreamEnd }
        ));
    }

    #[test]
    fn test_document_starting_with_end() {
        let err = Document::from_events(vec![Event::ElementEnd]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEvent { found: EventKind::ElementEnd, .. }));
    }

    #[test]
    fn test_trailing_events_after_root() {
        let doc = Document::from_events(vec![
            Event::start("a"),
            Event::ElementEnd,
            Event::start("b"),
            Event::ElementEnd,
        ])
        .unwrap();
        assert_eq!(doc.end_of_span().unwrap(), 2);
        assert!(matches!(
            doc.event_count(),
            Err(Error::UnexpectedEvent { position: 2, found: EventKind::ElementStart, .. })
        ));
    }

    #[test]
    fn test_from_reader() {
        let doc = Document::from_reader(&b"<r x='1'>hi</r>"[..]).unwrap();
        assert_eq!(doc.to_string(), "<r x='1'>hi</r>");
    }

    #[test]
    fn test_from_reader_decodes_once() {
        // a second BOM is content; the bad attribute is reported past it
        let mut bytes = vec![0xEF, 0xBB, 0xBF, 0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<r x=1/>");
        let err = Document::from_reader(&bytes[..]).unwrap_err();
        assert!(matches!(err, Error::Syntax { position: 8, .. }));
    }

    #[test]
    fn test_nesting_limit_from_config() {
        let config = ReaderConfig::default().max_depth(3);
        let doc = Document::parse_str_with("<a><b><c><d/></c></b></a>", config).unwrap();
        assert!(matches!(doc.event_count(), Err(Error::DepthLimit { max_depth: 3, .. })));
        assert!(doc.render().is_err());

        let doc = Document::parse_str_with("<a><b><c/></b></a>", config).unwrap();
        assert_eq!(doc.event_count().unwrap(), 6);
    }

    #[test]
    fn test_nesting_limit_on_event_lists() {
        let mut events: Vec<Event> = (0..400).map(|_| Event::start("a")).collect();
        events.extend((0..400).map(|_| Event::ElementEnd));
        let doc = Document::from_events(events).unwrap();
        assert!(matches!(
            doc.end_of_span(),
            Err(Error::DepthLimit { max_depth: DEFAULT_MAX_DEPTH, position: DEFAULT_MAX_DEPTH })
        ));
    }

    #[test]
    fn test_parse_bytes_with_config() {
        let config = ReaderConfig::default().trim_text(true);
        let doc = Document::parse_bytes_with(b"<r>\n  <a/>\n</r>".to_vec(), config).unwrap();
        assert_eq!(doc.render().unwrap(), "<r><a/></r>");
    }
}
