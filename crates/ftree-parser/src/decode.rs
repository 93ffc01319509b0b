//! Byte-level input decoding.
//!
//! Files come as UTF-8 or, from some desktop genealogy programs, as UTF-16
//! with a byte-order mark. [`decode`] picks the encoding from the BOM and
//! never fails: undecodable bytes become U+FFFD with a warning.

use std::char::REPLACEMENT_CHARACTER;

use log::debug;

use crate::{
    Span,
    error::{Diagnostic, ErrorCode},
};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const UTF16_LE_BOM: &[u8] = b"\xFF\xFE";
const UTF16_BE_BOM: &[u8] = b"\xFE\xFF";

/// Detected text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Decoded source text. Any byte-order mark is removed from `text`.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: Encoding,
    pub diagnostics: Vec<Diagnostic>,
}

/// Decode raw file bytes into text.
pub fn decode(bytes: &[u8]) -> Decoded {
    let decoded = if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        decode_utf16(rest, Encoding::Utf16Le, u16::from_le_bytes)
    } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        decode_utf16(rest, Encoding::Utf16Be, u16::from_be_bytes)
    } else {
        decode_utf8(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
    };
    debug!(encoding:? = decoded.encoding, bytes = decoded.text.len(); "Input decoded");
    decoded
}

fn decode_utf8(bytes: &[u8]) -> Decoded {
    let (text, diagnostics) = match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), Vec::new()),
        Err(err) => {
            let offset = err.valid_up_to();
            let text = String::from_utf8_lossy(bytes).into_owned();
            let diagnostic = Diagnostic::warning(format!(
                "invalid UTF-8 at byte {offset}; undecodable bytes were replaced"
            ))
            .with_code(ErrorCode::E006)
            .with_label(
                Span::new(offset..offset + REPLACEMENT_CHARACTER.len_utf8()),
                "first replaced byte",
            )
            .with_help("save the file as UTF-8");
            (text, vec![diagnostic])
        }
    };
    Decoded {
        text,
        encoding: Encoding::Utf8,
        diagnostics,
    }
}

fn decode_utf16(bytes: &[u8], encoding: Encoding, read: fn([u8; 2]) -> u16) -> Decoded {
    let chunks = bytes.chunks_exact(2);
    let odd_length = !chunks.remainder().is_empty();
    let units = chunks.map(|pair| read([pair[0], pair[1]]));

    let mut replaced = 0usize;
    let text: String = char::decode_utf16(units)
        .map(|unit| {
            unit.unwrap_or_else(|_| {
                replaced += 1;
                REPLACEMENT_CHARACTER
            })
        })
        .collect();

    let mut diagnostics = Vec::new();
    if replaced > 0 || odd_length {
        let mut message = format!("{replaced} invalid UTF-16 sequence(s) replaced");
        if odd_length {
            message.push_str("; trailing odd byte ignored");
        }
        diagnostics.push(
            Diagnostic::warning(message)
                .with_code(ErrorCode::E006)
                .with_help("the file may be truncated or not UTF-16 after all"),
        );
    }

    Decoded {
        text,
        encoding,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str, bom: &[u8], encode: fn(u16) -> [u8; 2]) -> Vec<u8> {
        let mut bytes = bom.to_vec();
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&encode(unit));
        }
        bytes
    }

    #[test]
    fn test_plain_utf8() {
        let decoded = decode("0 HEAD\n".as_bytes());
        assert_eq!(decoded.encoding, Encoding::Utf8);
        assert_eq!(decoded.text, "0 HEAD\n");
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_utf8_bom_is_removed() {
        let decoded = decode(b"\xEF\xBB\xBF0 HEAD");
        assert_eq!(decoded.text, "0 HEAD");
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let bytes = utf16("0 HEAD\n1 NAME Zoë", UTF16_LE_BOM, u16::to_le_bytes);
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, Encoding::Utf16Le);
        assert_eq!(decoded.text, "0 HEAD\n1 NAME Zoë");
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_utf16_be_with_bom() {
        let bytes = utf16("0 TRLR", UTF16_BE_BOM, u16::to_be_bytes);
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, Encoding::Utf16Be);
        assert_eq!(decoded.text, "0 TRLR");
    }

    #[test]
    fn test_invalid_utf8_is_lossy_with_warning() {
        let decoded = decode(b"0 HEAD\n1 NAME Jos\xE9\n");
        assert!(decoded.text.contains('\u{FFFD}'));
        assert_eq!(decoded.diagnostics.len(), 1);
        let diag = &decoded.diagnostics[0];
        assert!(diag.severity().is_warning());
        assert_eq!(diag.code(), Some(ErrorCode::E006));
        assert_eq!(diag.labels()[0].span().start(), 17);
    }

    #[test]
    fn test_odd_utf16_length_is_reported() {
        let mut bytes = utf16("0 HEAD", UTF16_LE_BOM, u16::to_le_bytes);
        bytes.push(b'x');
        let decoded = decode(&bytes);
        assert_eq!(decoded.text, "0 HEAD");
        assert_eq!(decoded.diagnostics.len(), 1);
    }
}
