//! Sibling sequences
//!
//! The children of an element (and the document's top level) form a
//! [`MemoLazySequence`] whose state is the cursor of the next sibling. Each
//! step reads one node and skips past its span; skipping an element forces
//! that element's own children first.

use super::memo::{Iter as MemoIter, MemoLazySequence, Step};
use super::node::{Element, Node, Text};
use super::stream::{Cursor, EventStream};
use crate::error::Result;
use crate::reader::events::Event;
use std::fmt;
use std::sync::Arc;

/// Reads the sibling at a cursor and returns the cursor after it
pub struct SiblingStep {
    stream: Arc<EventStream>,
}

impl Step<Cursor, Node> for SiblingStep {
    fn step(&self, cursor: &Cursor) -> Result<Option<(Cursor, Node)>> {
        let cursor = *cursor;
        match self.stream.event_at(cursor)? {
            Event::ElementStart(start) => {
                let element = Element::from_start(&self.stream, cursor, start);
                let next = element.end_of_span()?;
                Ok(Some((next, Node::Element(element))))
            }
            Event::Text(content) => {
                let text = Text::new(cursor, content);
                Ok(Some((text.end_of_span(), Node::Text(text))))
            }
            Event::ElementEnd | Event::StreamEnd => Ok(None),
        }
    }
}

/// Lazily materialized run of sibling nodes.
///
/// Cloning shares the memo table.
#[derive(Clone)]
pub struct NodeSequence {
    start: Cursor,
    stream: Arc<EventStream>,
    seq: Arc<MemoLazySequence<Cursor, Node, SiblingStep>>,
}

impl NodeSequence {
    /// Siblings starting at `start`; nothing is read until first access
    pub fn new(stream: Arc<EventStream>, start: Cursor) -> Self {
        let step = SiblingStep {
            stream: Arc::clone(&stream),
        };
        NodeSequence {
            start,
            stream,
            seq: Arc::new(MemoLazySequence::new(start, step)),
        }
    }

    /// Cursor of the first sibling
    pub fn start(&self) -> Cursor {
        self.start
    }

    /// The event stream this sequence reads from
    pub fn stream(&self) -> &Arc<EventStream> {
        &self.stream
    }

    /// Child `index`, forcing every earlier sibling (and its subtree) first
    pub fn get(&self, index: usize) -> Result<Arc<Node>> {
        self.seq.get(index)
    }

    pub fn try_get(&self, index: usize) -> Result<Option<Arc<Node>>> {
        self.seq.try_get(index)
    }

    /// Force every sibling and count them
    pub fn len(&self) -> Result<usize> {
        self.seq.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.seq.is_empty()
    }

    /// Number of siblings materialized so far; never forces
    pub fn forced_len(&self) -> usize {
        self.seq.forced_len()
    }

    /// Force every sibling and return the cursor just past the last one,
    /// i.e. the position of the enclosing element's end event
    pub fn parse(&self) -> Result<Cursor> {
        self.seq.final_state()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.seq.iter() }
    }

    /// Element children only
    pub fn elements(&self) -> impl Iterator<Item = Result<Arc<Node>>> + '_ {
        self.iter()
            .filter(|node| node.as_ref().map_or(true, |n| n.is_element()))
    }

    /// Element children whose qualified or lexical name is `name`
    pub fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Result<Arc<Node>>> + 'a {
        self.iter().filter(move |node| match node {
            Ok(n) => n
                .as_element()
                .is_some_and(|e| e.qualified_name() == name || e.name() == name),
            Err(_) => true,
        })
    }

    /// Concatenated content of the text children
    pub fn text(&self) -> Result<String> {
        let mut out = String::new();
        for node in self.iter() {
            if let Some(text) = node?.as_text() {
                out.push_str(text.content());
            }
        }
        Ok(out)
    }
}

impl fmt::Debug for NodeSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSequence")
            .field("start", &self.start)
            .field("forced", &self.seq.forced_len())
            .field("exhausted", &self.seq.is_exhausted())
            .finish()
    }
}

/// Forcing iterator over siblings
pub struct Iter<'a> {
    inner: MemoIter<'a, Cursor, Node, SiblingStep>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<Arc<Node>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a> IntoIterator for &'a NodeSequence {
    type Item = Result<Arc<Node>>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
