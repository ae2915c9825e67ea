//! Entity reference decoding
//!
//! Handles the five predefined entities (`&lt;` `&gt;` `&amp;` `&quot;`
//! `&apos;`) and numeric character references. Unknown references are left in
//! place verbatim. Returns `Cow::Borrowed` when the input has no '&'.

use memchr::memchr;
use std::borrow::Cow;

/// Decode entity references in text or attribute values
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = memchr(b'&', rest) {
        out.extend_from_slice(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = memchr(b';', rest).and_then(|semi| {
            let mut buf = [0u8; 4];
            decode_reference(&rest[1..semi])
                .map(|c| (semi, c.encode_utf8(&mut buf).as_bytes().to_vec()))
        });

        match decoded {
            Some((semi, bytes)) => {
                out.extend_from_slice(&bytes);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push(b'&');
                rest = &rest[1..];
            }
        }
    }

    out.extend_from_slice(rest);
    out
}

/// Decode the body of a reference (between '&' and ';')
fn decode_reference(entity: &[u8]) -> Option<char> {
    match entity {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => {
            let hex = std::str::from_utf8(hex).ok()?;
            char::from_u32(u32::from_str_radix(hex, 16).ok()?)
        }
        [b'#', dec @ ..] => {
            let dec = std::str::from_utf8(dec).ok()?;
            char::from_u32(dec.parse::<u32>().ok()?)
        }
        _ => None,
    }
}
