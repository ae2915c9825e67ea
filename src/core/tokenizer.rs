//! XML Tokenizer - markup lexing over a byte slice
//!
//! Pull-style tokenizer that splits input into:
//! - Element start/end/empty tags
//! - Text content (entities decoded on request)
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE declarations
//!
//! The tokenizer is resumable: it carries no state besides the byte offset,
//! so a reader can drop it between pulls and re-create it at `position()`.

use super::entities::decode_text;
use super::scanner::Scanner;
use crate::error::{Error, Result};
use memchr::memmem;
use std::borrow::Cow;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// End of input
    Eof,
}

/// A lexed token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// Tag name or PI target
    pub name: Option<&'a [u8]>,
    /// Text/CDATA/comment content, or the raw attribute list of a tag
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Lenient XML tokenizer
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    decode: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `input` starting at byte `pos`
    pub fn at(input: &'a [u8], pos: usize, decode: bool) -> Self {
        Tokenizer {
            scanner: Scanner::at(input, pos),
            decode,
        }
    }

    /// Byte offset of the next token
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Lex the next token; `Eof` is returned at (and after) end of input
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let pos = self.scanner.position();
        match self.scanner.peek() {
            None => Ok(Token::new(TokenKind::Eof, (pos, pos))),
            Some(b'<') => self.parse_markup(),
            Some(_) => Ok(self.parse_text()),
        }
    }

    fn parse_text(&mut self) -> Token<'a> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(start + self.scanner.remaining().len());
        self.scanner.set_position(end);

        let raw = self.scanner.slice(start, end);
        let content = if self.decode { decode_text(raw) } else { Cow::Borrowed(raw) };
        Token::new(TokenKind::Text, (start, end)).with_content(content)
    }

    fn parse_markup(&mut self) -> Result<Token<'a>> {
        let start = self.scanner.position();
        self.scanner.advance(1); // '<'

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'?') => self.parse_pi(start),
            Some(b'!') if self.scanner.starts_with(b"!--") => {
                self.parse_delimited(start, 3, b"-->", TokenKind::Comment, "unterminated comment")
            }
            Some(b'!') if self.scanner.starts_with(b"![CDATA[") => {
                self.parse_delimited(start, 8, b"]]>", TokenKind::CData, "unterminated CDATA section")
            }
            Some(b'!') if self.scanner.starts_with(b"!DOCTYPE") => self.parse_doctype(start),
            Some(b'!') => Err(Error::syntax("expected comment, CDATA, or DOCTYPE", start)),
            _ => self.parse_start_tag(start),
        }
    }

    fn parse_start_tag(&mut self, start: usize) -> Result<Token<'a>> {
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| Error::syntax("invalid element name", self.scanner.position()))?;
        let attrs_start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_end_quoted()
            .ok_or_else(|| Error::syntax("unterminated start tag", start))?;

        let is_empty = end > attrs_start && self.scanner.slice(end - 1, end) == b"/";
        let attrs_end = if is_empty { end - 1 } else { end };
        let attrs = self.scanner.slice(attrs_start, attrs_end);
        self.scanner.set_position(end + 1);

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Ok(Token::new(kind, (start, end + 1))
            .with_name(name)
            .with_content(Cow::Borrowed(attrs)))
    }

    fn parse_end_tag(&mut self, start: usize) -> Result<Token<'a>> {
        self.scanner.advance(1); // '/'
        let name = self
            .scanner
            .read_name()
            .ok_or_else(|| Error::syntax("invalid element name in end tag", self.scanner.position()))?;
        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            return Err(Error::syntax("end tag cannot have attributes or other content", self.scanner.position()));
        }
        self.scanner.advance(1);
        Ok(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    fn parse_pi(&mut self, start: usize) -> Result<Token<'a>> {
        self.scanner.advance(1); // '?'
        let target = self
            .scanner
            .read_name()
            .ok_or_else(|| Error::syntax("invalid processing instruction target", self.scanner.position()))?;
        let data_start = self.scanner.position();
        let end = memmem::find(self.scanner.remaining(), b"?>")
            .map(|i| data_start + i)
            .ok_or_else(|| Error::syntax("unterminated processing instruction", start))?;
        self.scanner.set_position(end + 2);

        let kind = if target == b"xml" {
            TokenKind::XmlDeclaration
        } else {
            TokenKind::ProcessingInstruction
        };
        Ok(Token::new(kind, (start, end + 2))
            .with_name(target)
            .with_content(Cow::Borrowed(self.scanner.slice(data_start, end))))
    }

    /// Comment and CDATA: skip `open` bytes after '<', then read up to `close`
    fn parse_delimited(
        &mut self,
        start: usize,
        open: usize,
        close: &[u8],
        kind: TokenKind,
        unterminated: &'static str,
    ) -> Result<Token<'a>> {
        self.scanner.advance(open);
        let content_start = self.scanner.position();
        let end = memmem::find(self.scanner.remaining(), close)
            .map(|i| content_start + i)
            .ok_or_else(|| Error::syntax(unterminated, start))?;
        self.scanner.set_position(end + close.len());

        Ok(Token::new(kind, (start, self.scanner.position()))
            .with_content(Cow::Borrowed(self.scanner.slice(content_start, end))))
    }

    /// DOCTYPE, including an internal subset in brackets
    fn parse_doctype(&mut self, start: usize) -> Result<Token<'a>> {
        self.scanner.advance(8); // "!DOCTYPE"
        let mut depth = 0usize;
        let mut quote: Option<u8> = None;

        while let Some(b) = self.scanner.peek() {
            self.scanner.advance(1);
            match (quote, b) {
                (Some(q), _) if b == q => quote = None,
                (Some(_), _) => {}
                (None, b'"' | b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => {
                    let end = self.scanner.position();
                    return Ok(Token::new(TokenKind::DocType, (start, end))
                        .with_content(Cow::Borrowed(self.scanner.slice(start + 9, end - 1))));
                }
                _ => {}
            }
        }
        Err(Error::syntax("unterminated DOCTYPE declaration", start))
    }
}
