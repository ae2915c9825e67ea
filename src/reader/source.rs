//! Event sources
//!
//! Anything that can hand out the next event on demand. The lazy tree pulls
//! from a source one event at a time and never asks for an event twice.

use super::events::Event;
use crate::error::Result;

/// Pull-based producer of events
pub trait EventSource: Send {
    /// Produce the next event. After `StreamEnd` callers stop pulling.
    fn next_event(&mut self) -> Result<Event>;
}

/// Adapter for a pre-built iterator of events. An exhausted iterator reads
/// as `StreamEnd`.
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Result<Event>> + Send,
{
    pub fn new(iter: I) -> Self {
        IterSource { iter }
    }
}

impl<I> EventSource for IterSource<I>
where
    I: Iterator<Item = Result<Event>> + Send,
{
    fn next_event(&mut self) -> Result<Event> {
        self.iter.next().unwrap_or(Ok(Event::StreamEnd))
    }
}

impl<S: EventSource + ?Sized> EventSource for Box<S> {
    fn next_event(&mut self) -> Result<Event> {
        (**self).next_event()
    }
}
