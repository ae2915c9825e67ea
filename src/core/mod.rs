//! Core XML lexing primitives
//!
//! - Scanner: memchr-accelerated delimiter detection
//! - Tokenizer: resumable markup lexer
//! - Entities: predefined and numeric reference decoding (Cow, zero-copy when possible)
//! - Attributes: attribute list parsing and `prefix:local` splitting
//! - Encoding: UTF-16 detection and conversion to UTF-8

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
