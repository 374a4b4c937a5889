//! Decoding of escape sequences inside field values.
//!
//! Recognised sequences, shown with `\` as the escape character:
//!
//! | Sequence | Decodes to |
//! |---|---|
//! | `\F\` | field separator |
//! | `\S\` | component separator |
//! | `\T\` | subcomponent separator |
//! | `\R\` | repetition separator |
//! | `\E\` | escape character |
//! | `\Xhh..\` | the bytes given by the hex pairs |
//!
//! Formatting sequences (`\.br\`, `\H\`, `\N\`, ...) and anything
//! unterminated or malformed are kept verbatim.

use std::borrow::Cow;

use crate::delimiters::Delimiters;

/// Decode escape sequences in `text`, returning UTF-8 text.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn unescape(text: &[u8], delims: &Delimiters) -> String {
    match unescape_bytes(text, delims) {
        Cow::Borrowed(raw) => String::from_utf8_lossy(raw).into_owned(),
        Cow::Owned(decoded) => String::from_utf8_lossy(&decoded).into_owned(),
    }
}

/// Byte-level decoding; borrows when `text` holds no escape character.
pub fn unescape_bytes<'a>(text: &'a [u8], delims: &Delimiters) -> Cow<'a, [u8]> {
    let esc = delims.escape;
    if !text.contains(&esc) {
        return Cow::Borrowed(text);
    }

    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if text[i] != esc {
            out.push(text[i]);
            i += 1;
            continue;
        }
        let close = text[i + 1..].iter().position(|&b| b == esc);
        let Some(len) = close else {
            // unterminated: keep the rest as-is
            out.extend_from_slice(&text[i..]);
            break;
        };
        let body = &text[i + 1..i + 1 + len];
        match decode_sequence(body, delims) {
            Some(decoded) => out.extend_from_slice(&decoded),
            None => out.extend_from_slice(&text[i..i + len + 2]),
        }
        i += len + 2;
    }
    Cow::Owned(out)
}

fn decode_sequence(body: &[u8], delims: &Delimiters) -> Option<Vec<u8>> {
    match body {
        b"F" => Some(vec![delims.field]),
        b"S" => Some(vec![delims.component]),
        b"T" => Some(vec![delims.subcomponent]),
        b"R" => Some(vec![delims.repetition]),
        b"E" => Some(vec![delims.escape]),
        [b'X', hex @ ..] => decode_hex(hex),
        _ => None,
    }
}

fn decode_hex(hex: &[u8]) -> Option<Vec<u8>> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }
    hex.chunks(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(s, 16).ok()
        })
        .collect()
}
