//! XML Event Reader
//!
//! Turns tokenizer output into the four-variant event stream:
//! - empty tags become a start event followed by an end event
//! - CDATA becomes text
//! - comments, processing instructions, the XML declaration and DOCTYPE are dropped
//! - text outside the root element is dropped
//! - `xmlns` attributes become namespace bindings and element prefixes are resolved

use super::events::{Event, StartElement};
use super::namespace::NamespaceResolver;
use super::source::EventSource;
use crate::config::ReaderConfig;
use crate::core::attributes::parse_attributes;
use crate::core::encoding::{convert_to_utf8, utf8_at};
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::{Error, Result};

/// Pull reader producing [`Event`]s from an owned UTF-8 buffer
pub struct EventReader {
    input: Vec<u8>,
    position: usize,
    config: ReaderConfig,
    namespaces: NamespaceResolver,
    /// Lexical names of open elements, innermost last
    open: Vec<String>,
    /// An empty tag was just reported; its end event is owed
    pending_end: bool,
    /// Iterator side: stream end or an error has been yielded
    done: bool,
}

impl EventReader {
    /// Reader over bytes in any supported encoding
    pub fn from_bytes(input: Vec<u8>, config: ReaderConfig) -> Result<Self> {
        Ok(Self::from_utf8(convert_to_utf8(input)?, config))
    }

    pub fn new(input: &str, config: ReaderConfig) -> Self {
        Self::from_utf8(input.as_bytes().to_vec(), config)
    }

    /// Reader over input that is already BOM-free UTF-8
    pub(crate) fn from_utf8(input: Vec<u8>, config: ReaderConfig) -> Self {
        EventReader {
            input,
            position: 0,
            config,
            namespaces: NamespaceResolver::new(),
            open: Vec::new(),
            pending_end: false,
            done: false,
        }
    }

    /// Byte offset of the next unread token
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Read the next event.
    ///
    /// A failure does not advance the reader, so asking again reports the
    /// same error.
    pub fn read_event(&mut self) -> Result<Event> {
        if self.pending_end {
            self.pending_end = false;
            self.close_element();
            return Ok(Event::ElementEnd);
        }

        loop {
            let mut tokenizer = Tokenizer::at(&self.input, self.position, self.config.decode_entities);
            let token = tokenizer.next_token()?;
            let next_position = tokenizer.position();

            match token.kind {
                TokenKind::Eof => {
                    if !self.open.is_empty() {
                        tracing::debug!(open = self.open.len(), "input ended inside an element");
                    }
                    return Ok(Event::StreamEnd);
                }

                TokenKind::StartTag | TokenKind::EmptyTag => {
                    if self.open.len() >= self.config.max_depth {
                        return Err(Error::DepthLimit {
                            max_depth: self.config.max_depth,
                            position: token.span.0,
                        });
                    }
                    let (start, name) = start_element(&token, &mut self.namespaces, self.config.decode_entities)?;
                    self.position = next_position;
                    self.open.push(name);
                    self.pending_end = token.kind == TokenKind::EmptyTag;
                    return Ok(Event::ElementStart(start));
                }

                TokenKind::EndTag => {
                    let name = utf8_at(token.name.unwrap_or_default(), token.span.0 + 2)?;
                    match self.open.last() {
                        None => {
                            return Err(Error::UnexpectedEndTag {
                                name: name.to_string(),
                            })
                        }
                        Some(open) if self.config.check_end_names && open != name => {
                            return Err(Error::MismatchedEndTag {
                                expected: open.clone(),
                                found: name.to_string(),
                            })
                        }
                        Some(_) => {}
                    }
                    self.position = next_position;
                    self.close_element();
                    return Ok(Event::ElementEnd);
                }

                TokenKind::Text | TokenKind::CData => {
                    let content = token.content.as_deref().unwrap_or_default();
                    let text = utf8_at(content, token.span.0)?;
                    self.position = next_position;

                    if self.open.is_empty() {
                        continue;
                    }
                    let text = if self.config.trim_text && token.kind == TokenKind::Text {
                        text.trim()
                    } else {
                        text
                    };
                    if text.is_empty() {
                        continue;
                    }
                    return Ok(Event::Text(text.to_string()));
                }

                TokenKind::Comment
                | TokenKind::ProcessingInstruction
                | TokenKind::XmlDeclaration
                | TokenKind::DocType => {
                    self.position = next_position;
                }
            }
        }
    }

    fn close_element(&mut self) {
        self.open.pop();
        self.namespaces.pop_scope();
    }
}

/// Build the start event for a start/empty tag token and open its namespace
/// scope. Returns the event and the lexical tag name.
fn start_element(
    token: &Token<'_>,
    namespaces: &mut NamespaceResolver,
    decode: bool,
) -> Result<(StartElement, String)> {
    let name_bytes = token.name.unwrap_or_default();
    let name = utf8_at(name_bytes, token.span.0 + 1)?;
    let attrs_offset = token.span.0 + 1 + name_bytes.len();
    let raw_attrs = token.content.as_deref().unwrap_or_default();
    let attrs = parse_attributes(raw_attrs, decode)
        .map_err(|(offset, message)| Error::syntax(message, attrs_offset + offset))?;

    let mut bindings = Vec::new();
    let mut attributes = Vec::with_capacity(attrs.len());
    for attr in &attrs {
        let value = utf8_at(&attr.value, attrs_offset)?.to_string();
        match attr.namespace_declaration() {
            Some(prefix) => bindings.push((utf8_at(prefix, attrs_offset)?.to_string(), value)),
            None => attributes.push((utf8_at(attr.name, attrs_offset)?.to_string(), value)),
        }
    }

    namespaces.push_scope();
    for (prefix, uri) in &bindings {
        namespaces.declare(prefix, uri);
    }

    let (prefix, local_name) = match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    };
    let namespace_uri = match prefix {
        Some(prefix) => namespaces.resolve(prefix),
        None => namespaces.resolve_default(),
    };
    if prefix.is_some() && namespace_uri.is_none() {
        tracing::debug!(element = name, "unbound namespace prefix");
    }

    let start = StartElement {
        namespace_uri: namespace_uri.map(str::to_owned),
        prefix: prefix.map(str::to_owned),
        local_name: local_name.to_string(),
        namespace_bindings: bindings,
        attributes,
    };
    Ok((start, name.to_string()))
}

impl EventSource for EventReader {
    fn next_event(&mut self) -> Result<Event> {
        self.read_event()
    }
}

impl Iterator for EventReader {
    type Item = Result<Event>;

    /// Yields events up to and including `StreamEnd`, or up to the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let event = self.read_event();
        self.done = matches!(event, Ok(Event::StreamEnd) | Err(_));
        Some(event)
    }
}

/// Read every event of a document, `StreamEnd` included
pub fn read_events(input: &str, config: ReaderConfig) -> Result<Vec<Event>> {
    EventReader::new(input, config).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(input: &str) -> Vec<Event> {
        read_events(input, ReaderConfig::default()).unwrap()
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            events("<root>hello</root>"),
            vec![Event::start("root"), Event::text("hello"), Event::ElementEnd, Event::StreamEnd]
        );
    }

    #[test]
    fn test_empty_element_expands() {
        assert_eq!(
            events("<a><b/></a>"),
            vec![Event::start("a"), Event::start("b"), Event::ElementEnd, Event::ElementEnd, Event::StreamEnd]
        );
    }

    #[test]
    fn test_attributes_and_bindings_split() {
        let all = events("<x:a xmlns:x='urn:x' xmlns='urn:d' id='1' x:k=\"v\"><b/></x:a>");
        let a = all[0].as_start_element().unwrap();
        assert_eq!(a.namespace_uri.as_deref(), Some("urn:x"));
        assert_eq!(a.prefix.as_deref(), Some("x"));
        assert_eq!(a.local_name, "a");
        assert_eq!(
            a.namespace_bindings,
            vec![("x".to_string(), "urn:x".to_string()), (String::new(), "urn:d".to_string())]
        );
        assert_eq!(
            a.attributes,
            vec![("id".to_string(), "1".to_string()), ("x:k".to_string(), "v".to_string())]
        );

        let b = all[1].as_start_element().unwrap();
        assert_eq!(b.namespace_uri.as_deref(), Some("urn:d"));
        assert!(b.namespace_bindings.is_empty());
    }

    #[test]
    fn test_namespace_scope_ends_with_element() {
        let all = events("<r><a xmlns='urn:a'/><b/></r>");
        assert_eq!(all[1].as_start_element().unwrap().namespace_uri.as_deref(), Some("urn:a"));
        assert_eq!(all[3].as_start_element().unwrap().namespace_uri, None);
    }

    #[test]
    fn test_misc_markup_dropped() {
        let all = events("<?xml version='1.0'?>\n<!DOCTYPE r>\n<!-- c -->\n<r><?pi x?><![CDATA[<raw>]]><!-- c --></r>\n");
        assert_eq!(
            all,
            vec![Event::start("r"), Event::text("<raw>"), Event::ElementEnd, Event::StreamEnd]
        );
    }

    #[test]
    fn test_trim_text() {
        let config = ReaderConfig::default().trim_text(true);
        let all = read_events("<r>\n  <a> x </a>\n</r>", config).unwrap();
        assert_eq!(
            all,
            vec![
                Event::start("r"),
                Event::start("a"),
                Event::text("x"),
                Event::ElementEnd,
                Event::ElementEnd,
                Event::StreamEnd,
            ]
        );
    }

    #[test]
    fn test_mismatched_end_tag() {
        let mut reader = EventReader::new("<a><b></a>", ReaderConfig::default());
        assert!(reader.read_event().is_ok());
        assert!(reader.read_event().is_ok());
        let err = reader.read_event().unwrap_err();
        assert!(matches!(err, Error::MismatchedEndTag { ref expected, ref found } if expected == "b" && found == "a"));
        // The reader did not advance past the failure
        assert!(matches!(reader.read_event(), Err(Error::MismatchedEndTag { .. })));
    }

    #[test]
    fn test_unchecked_end_names() {
        let config = ReaderConfig::default().check_end_names(false);
        let all = read_events("<a><b></c></a>", config).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_unclosed_element_ends_stream() {
        assert_eq!(events("<a><b>"), vec![Event::start("a"), Event::start("b"), Event::StreamEnd]);
    }

    #[test]
    fn test_stray_end_tag() {
        let result = read_events("<a/></a>", ReaderConfig::default());
        assert!(matches!(result, Err(Error::UnexpectedEndTag { .. })));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut reader = EventReader::new("<a x=1/>", ReaderConfig::default());
        assert!(matches!(reader.next(), Some(Err(Error::Syntax { .. }))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_depth_limit() {
        let config = ReaderConfig::default().max_depth(2);
        let mut reader = EventReader::new("<a><b><c/></b></a>", config);
        assert!(reader.read_event().is_ok());
        assert!(reader.read_event().is_ok());
        assert!(matches!(
            reader.read_event(),
            Err(Error::DepthLimit { max_depth: 2, position: 6 })
        ));
        assert!(matches!(reader.read_event(), Err(Error::DepthLimit { .. })));
        assert_eq!(reader.depth(), 2);

        let ok = read_events("<a><b/></a>", config).unwrap();
        assert_eq!(ok.len(), 5);
    }

    #[test]
    fn test_undeclared_prefix_has_no_namespace() {
        let all = events("<r xmlns:p='urn:p'><q xmlns:p=''><p:x/></q></r>");
        let x = all[2].as_start_element().unwrap();
        assert_eq!(x.prefix.as_deref(), Some("p"));
        assert_eq!(x.namespace_uri, None);
    }

    #[test]
    fn test_utf16_input() {
        let utf16: Vec<u8> = "<r>é</r>".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let mut bytes = vec![0xFF, 0xFE];
        bytes.extend(utf16);
        let all: Vec<Event> = EventReader::from_bytes(bytes, ReaderConfig::default())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(all[1], Event::text("é"));
    }
}
