//! Input encoding detection and normalization
//!
//! Detects UTF-16 input by byte order mark (or the `<\0` / `\0<` pattern of
//! an unmarked document) and converts it to UTF-8. A UTF-8 BOM is stripped.

use crate::error::{Error, Result};

/// Encoding of a byte source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from the first bytes of the input
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            _ => XmlEncoding::Utf8,
        }
    }
}

/// Normalize raw bytes to BOM-free UTF-8
pub fn convert_to_utf8(mut input: Vec<u8>) -> Result<Vec<u8>> {
    match XmlEncoding::detect(&input) {
        XmlEncoding::Utf8 => {
            if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
                input.drain(..3);
            }
            Ok(input)
        }
        XmlEncoding::Utf16Le => decode_utf16(&input, [0xFF, 0xFE], u16::from_le_bytes),
        XmlEncoding::Utf16Be => decode_utf16(&input, [0xFE, 0xFF], u16::from_be_bytes),
    }
}

fn decode_utf16(input: &[u8], bom: [u8; 2], unit: fn([u8; 2]) -> u16) -> Result<Vec<u8>> {
    let bytes = input.strip_prefix(&bom[..]).unwrap_or(input);
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding("invalid UTF-16: odd number of bytes".to_string()));
    }

    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map(String::into_bytes)
        .map_err(|e| Error::Encoding(format!("invalid UTF-16: {}", e)))
}

/// View bytes as UTF-8 text, reporting the byte offset on failure
pub fn utf8_at(bytes: &[u8], position: usize) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        Error::Encoding(format!(
            "invalid UTF-8 at byte {}",
            position + e.valid_up_to()
        ))
    })
}
