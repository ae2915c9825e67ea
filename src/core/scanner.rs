//! Byte scanner for markup delimiters
//!
//! Thin cursor over the input bytes. Delimiter searches go through memchr,
//! which picks SSE2/AVX2/NEON at runtime.

use memchr::{memchr, memchr3};

/// Cursor over a byte slice
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner positioned at `pos`
    #[inline]
    pub fn at(input: &'a [u8], pos: usize) -> Self {
        Scanner {
            input,
            pos: pos.min(input.len()),
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start..end]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Skip XML whitespace (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek() {
            self.pos += 1;
        }
    }

    /// Absolute position of the next `byte`
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.remaining()).map(|i| self.pos + i)
    }

    /// Absolute position of the next '<' (end of a text run)
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        self.find_byte(b'<')
    }

    /// Absolute position of the next '>' that is not inside a quoted value
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut pos = self.pos;
        loop {
            let at = pos + memchr3(b'>', b'"', b'\'', &self.input[pos..])?;
            match self.input[at] {
                b'>' => return Some(at),
                quote => {
                    let close = at + 1 + memchr(quote, &self.input[at + 1..])?;
                    pos = close + 1;
                }
            }
        }
    }

    /// Read an XML name and advance past it
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        if !is_name_start_char(self.peek()?) {
            return None;
        }
        self.pos += 1;
        while self.peek().map_or(false, is_name_char) {
            self.pos += 1;
        }
        Some(&self.input[start..self.pos])
    }
}

/// Name start characters: ASCII letters, underscore, colon, and any non-ASCII
/// byte (validated as UTF-8 later)
#[inline]
pub fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
pub fn is_name_char(b: u8) -> bool {
    is_name_start_char(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
