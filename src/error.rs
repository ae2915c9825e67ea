//! Error Types
//!
//! A single error enum covers both malformed event streams observed by the
//! lazy tree and failures that originate in the tokenizer/reader layer.

use crate::reader::events::EventKind;

/// Errors produced while reading or forcing a lazy document
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event at a cursor is not the kind the caller needed
    #[error("unexpected event at position {position}: expected {expected}, found {found}")]
    UnexpectedEvent {
        position: usize,
        expected: EventKind,
        found: EventKind,
    },

    /// Indexed access past the natural end of a lazy sequence
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A cursor beyond the stream-end event was requested
    #[error("position {position} is past the end of the event stream")]
    PastStreamEnd { position: usize },

    /// Lexical error reported by the tokenizer
    #[error("syntax error at byte {position}: {message}")]
    Syntax { message: String, position: usize },

    /// End tag does not close the innermost open element
    #[error("tag mismatch: <{expected}> closed with </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// End tag without any open element
    #[error("unexpected end tag </{name}> without matching start tag")]
    UnexpectedEndTag { name: String },

    /// Elements nested deeper than the configured limit
    #[error("element nesting exceeds {max_depth} levels at position {position}")]
    DepthLimit { max_depth: usize, position: usize },

    /// Input could not be decoded as text
    #[error("encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The rendering sink refused output
    #[error("formatter error")]
    Fmt(#[from] std::fmt::Error),

    /// A memo table lock was poisoned by a panicking thread
    #[error("lock poisoned")]
    Poisoned,
}

impl Error {
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        Error::Syntax {
            message: message.into(),
            position,
        }
    }
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;
