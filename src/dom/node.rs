//! Lazy XML nodes
//!
//! A node is a view of one span of the event stream. Building a node reads a
//! single event; an element's children are only read when its
//! [`NodeSequence`] is forced.

use super::sequence::NodeSequence;
use super::stream::{Cursor, EventStream};
use crate::error::{Error, Result};
use crate::reader::events::{Event, EventKind, StartElement};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Element or text node
#[derive(Clone)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    /// Cursor just past this node's span
    pub fn end_of_span(&self) -> Result<Cursor> {
        match self {
            Node::Element(e) => e.end_of_span(),
            Node::Text(t) => Ok(t.end_of_span()),
        }
    }

    /// Cursor of this node's first event
    pub fn position(&self) -> Cursor {
        match self {
            Node::Element(e) => e.position(),
            Node::Text(t) => t.position(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    /// Compare structure (names, namespaces, bindings, attributes, children,
    /// text), forcing both subtrees as needed
    pub fn structural_eq(&self, other: &Node) -> Result<bool> {
        match (self, other) {
            (Node::Element(a), Node::Element(b)) => a.structural_eq(b),
            (Node::Text(a), Node::Text(b)) => Ok(a.content() == b.content()),
            _ => Ok(false),
        }
    }
}

/// Structural equality; a subtree that fails to materialize compares unequal
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other).unwrap_or(false)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Element(e) => fmt::Debug::fmt(e, f),
            Node::Text(t) => fmt::Debug::fmt(t, f),
        }
    }
}

/// Element view over an event span
#[derive(Clone)]
pub struct Element {
    start: Arc<StartElement>,
    position: Cursor,
    children: NodeSequence,
}

impl Element {
    /// Read the element-start event at `cursor`. Children are not read.
    pub fn parse(stream: &Arc<EventStream>, cursor: Cursor) -> Result<Element> {
        match stream.event_at(cursor)? {
            Event::ElementStart(start) => Ok(Element::from_start(stream, cursor, start)),
            other => Err(Error::UnexpectedEvent {
                position: cursor,
                expected: EventKind::ElementStart,
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn from_start(stream: &Arc<EventStream>, cursor: Cursor, start: StartElement) -> Element {
        Element {
            start: Arc::new(start),
            position: cursor,
            children: NodeSequence::new(Arc::clone(stream), cursor + 1),
        }
    }

    /// Cursor of the element-start event
    pub fn position(&self) -> Cursor {
        self.position
    }

    /// Lazily materialized children
    pub fn children(&self) -> &NodeSequence {
        &self.children
    }

    /// Cursor just past this element's end event.
    ///
    /// Forces every child, then requires the element-end event that follows
    /// the last one.
    pub fn end_of_span(&self) -> Result<Cursor> {
        let close = self.children.parse()?;
        match self.children.stream().event_at(close)? {
            Event::ElementEnd => Ok(close + 1),
            other => Err(Error::UnexpectedEvent {
                position: close,
                expected: EventKind::ElementEnd,
                found: other.kind(),
            }),
        }
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        self.start.namespace_uri.as_deref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.start.prefix.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.start.local_name
    }

    /// Lexical tag name, `prefix:local` or `local`
    pub fn name(&self) -> Cow<'_, str> {
        match self.prefix() {
            Some(prefix) => Cow::Owned(format!("{}:{}", prefix, self.local_name())),
            None => Cow::Borrowed(self.local_name()),
        }
    }

    /// `namespace-uri:local` when in a namespace, otherwise the local name
    pub fn qualified_name(&self) -> Cow<'_, str> {
        match self.namespace_uri() {
            Some(uri) => Cow::Owned(format!("{}:{}", uri, self.local_name())),
            None => Cow::Borrowed(self.local_name()),
        }
    }

    /// Namespace declarations on this tag (prefix -> URI), in source order
    pub fn namespace_bindings(&self) -> &[(String, String)] {
        &self.start.namespace_bindings
    }

    /// URI bound to `prefix` on this tag itself; `""` is the default namespace
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        lookup(&self.start.namespace_bindings, prefix)
    }

    /// Attributes (qualified name -> value), in source order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.start.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        lookup(&self.start.attributes, name)
    }

    /// The start event this element was read from
    pub fn start_event(&self) -> &StartElement {
        &self.start
    }

    /// Compare structure, forcing both subtrees as needed
    pub fn structural_eq(&self, other: &Element) -> Result<bool> {
        let (a, b) = (&*self.start, &*other.start);
        if a.namespace_uri != b.namespace_uri
            || a.local_name != b.local_name
            || a.namespace_bindings != b.namespace_bindings
            || a.attributes != b.attributes
        {
            return Ok(false);
        }

        let (mut left, mut right) = (self.children.iter(), other.children.iter());
        loop {
            match (left.next().transpose()?, right.next().transpose()?) {
                (None, None) => return Ok(true),
                (Some(x), Some(y)) => {
                    if !x.structural_eq(&y)? {
                        return Ok(false);
                    }
                }
                _ => return Ok(false),
            }
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other).unwrap_or(false)
    }
}

/// Shows only what has been materialized; never forces
impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name())
            .field("namespace_uri", &self.namespace_uri())
            .field("attributes", &self.attributes())
            .field("position", &self.position)
            .field("forced_children", &self.children.forced_len())
            .finish()
    }
}

/// Text view over a single event
#[derive(Clone, PartialEq, Eq)]
pub struct Text {
    content: Arc<str>,
    position: Cursor,
}

impl Text {
    /// Read the text event at `cursor`
    pub fn parse(stream: &EventStream, cursor: Cursor) -> Result<Text> {
        match stream.event_at(cursor)? {
            Event::Text(content) => Ok(Text::new(cursor, content)),
            other => Err(Error::UnexpectedEvent {
                position: cursor,
                expected: EventKind::Text,
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn new(cursor: Cursor, content: String) -> Text {
        Text {
            content: content.into(),
            position: cursor,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn position(&self) -> Cursor {
        self.position
    }

    pub fn end_of_span(&self) -> Cursor {
        self.position + 1
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Text").field(&&*self.content).finish()
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}
