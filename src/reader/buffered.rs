//! Byte stream input
//!
//! Drains any `Read` source and normalizes the result to UTF-8 so the
//! tokenizer can work over one contiguous buffer.

use crate::core::encoding::convert_to_utf8;
use crate::error::Result;
use std::io::Read;

/// Initial buffer capacity for reading a source
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Read an entire XML document from a `Read` source as UTF-8
pub fn read_all<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(DEFAULT_BUFFER_SIZE);
    reader.read_to_end(&mut buffer)?;
    tracing::trace!(bytes = buffer.len(), "read document source");
    convert_to_utf8(buffer)
}
