//! Shared event arena
//!
//! Events are pulled from the source only when a cursor past the buffered
//! prefix is requested, and every pulled event is kept, so each event is
//! produced exactly once and cursors are plain integer offsets.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Error, Result};
use crate::reader::events::Event;
use crate::reader::source::EventSource;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Position of the next unconsumed event
pub type Cursor = usize;

struct Buffer {
    events: Vec<Event>,
    source: Box<dyn EventSource>,
    ended: bool,
    /// Open elements after the last buffered event
    depth: usize,
    max_depth: usize,
    /// Cursor of the start event that broke the nesting limit
    overflow: Option<Cursor>,
}

/// Read-once, append-only event buffer over an [`EventSource`]
pub struct EventStream {
    buffer: Mutex<Buffer>,
}

impl EventStream {
    pub fn new<S: EventSource + 'static>(source: S) -> Self {
        Self::with_max_depth(source, DEFAULT_MAX_DEPTH)
    }

    /// Stream that fails with `DepthLimit` once more than `max_depth`
    /// elements are open
    pub fn with_max_depth<S: EventSource + 'static>(source: S, max_depth: usize) -> Self {
        EventStream {
            buffer: Mutex::new(Buffer {
                events: Vec::with_capacity(64),
                source: Box::new(source),
                ended: false,
                depth: 0,
                max_depth,
                overflow: None,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Buffer>> {
        self.buffer.lock().map_err(|_| Error::Poisoned)
    }

    /// The event at `cursor`, pulling from the source as needed
    pub fn event_at(&self, cursor: Cursor) -> Result<Event> {
        let mut guard = self.lock()?;
        let buffer = &mut *guard;

        while buffer.events.len() <= cursor {
            if buffer.ended {
                return Err(Error::PastStreamEnd { position: cursor });
            }
            if let Some(position) = buffer.overflow {
                return Err(Error::DepthLimit {
                    max_depth: buffer.max_depth,
                    position,
                });
            }
            let event = buffer.source.next_event()?;
            let position = buffer.events.len();
            tracing::trace!(position, kind = %event.kind(), "pulled event");
            match event {
                Event::ElementStart(_) if buffer.depth >= buffer.max_depth => {
                    tracing::debug!(position, max_depth = buffer.max_depth, "element nesting limit reached");
                    buffer.overflow = Some(position);
                    return Err(Error::DepthLimit {
                        max_depth: buffer.max_depth,
                        position,
                    });
                }
                Event::ElementStart(_) => buffer.depth += 1,
                Event::ElementEnd => buffer.depth = buffer.depth.saturating_sub(1),
                _ => {}
            }
            if event == Event::StreamEnd {
                buffer.ended = true;
                tracing::debug!(events = buffer.events.len(), "event stream ended");
            }
            buffer.events.push(event);
        }
        Ok(buffer.events[cursor].clone())
    }

    /// Number of events pulled from the source so far
    pub fn pulled(&self) -> usize {
        match self.buffer.lock() {
            Ok(buffer) => buffer.events.len(),
            Err(poisoned) => poisoned.into_inner().events.len(),
        }
    }

    /// Whether the source has produced `StreamEnd`
    pub fn is_ended(&self) -> bool {
        match self.buffer.lock() {
            Ok(buffer) => buffer.ended,
            Err(poisoned) => poisoned.into_inner().ended,
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("pulled", &self.pulled())
            .field("ended", &self.is_ended())
            .finish()
    }
}
