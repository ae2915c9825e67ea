//! XML Attribute Parsing
//!
//! Parses the attribute list of a start tag (the bytes between the element
//! name and the closing `>` / `/>`).

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A raw attribute as it appears in a tag
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Lexical name, possibly `prefix:local`
    pub name: &'a [u8],
    /// Value with entities decoded (when requested)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    /// `Some(prefix)` when this attribute declares a namespace binding;
    /// the default namespace declaration (`xmlns`) yields an empty prefix
    pub fn namespace_declaration(&self) -> Option<&'a [u8]> {
        match split_name(self.name) {
            (None, b"xmlns") => Some(&b""[..]),
            (Some(b"xmlns"), local) => Some(local),
            _ => None,
        }
    }
}

/// Split a name into prefix and local name at the first colon
#[inline]
pub fn split_name(name: &[u8]) -> (Option<&[u8]>, &[u8]) {
    match memchr(b':', name) {
        Some(colon) => (Some(&name[..colon]), &name[colon + 1..]),
        None => (None, name),
    }
}

/// Parse an attribute list
///
/// Values must be quoted. Returns the offset (relative to `input`) together
/// with a message when the list is malformed.
pub fn parse_attributes(input: &[u8], decode: bool) -> Result<Vec<Attribute<'_>>, (usize, &'static str)> {
    let mut attrs = Vec::new();
    let mut pos = 0;

    loop {
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() {
            return Ok(attrs);
        }

        let name_start = pos;
        if !is_name_start_char(input[pos]) {
            return Err((pos, "attribute name must start with a letter, underscore, or colon"));
        }
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if input.get(pos) != Some(&b'=') {
            return Err((pos, "attribute value required"));
        }
        pos += 1;
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        let quote = match input.get(pos).copied() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err((pos, "attribute value must be quoted")),
        };
        pos += 1;
        let len = memchr(quote, &input[pos..]).ok_or((pos, "attribute value has mismatched quotes"))?;
        let raw = &input[pos..pos + len];
        pos += len + 1;

        let value = if decode { decode_text(raw) } else { Cow::Borrowed(raw) };
        attrs.push(Attribute { name, value });
    }
}
