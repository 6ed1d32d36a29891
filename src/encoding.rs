//! Character encoding detection and decoding.
//!
//! Raw bytes handed to [`Document::parse_bytes`](crate::Document::parse_bytes)
//! are decoded to UTF-8 before parsing. The encoding is either requested
//! explicitly through [`Options::encoding`](crate::Options::encoding) or
//! sniffed from a byte-order mark and HTML meta tags.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Error, Result};
use crate::patterns::{CHARSET_META_RE, CONTENT_TYPE_CHARSET_RE};

/// Detect character encoding from HTML bytes.
///
/// Looks for an encoding in the following order:
/// 1. A byte-order mark
/// 2. `<meta charset="...">`
/// 3. `<meta http-equiv="Content-Type" content="...; charset=...">`
/// 4. Defaults to UTF-8 if no declaration found
///
/// Only examines the first 1024 bytes for meta tags.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = &html[..html.len().min(1024)];
    let head_str = String::from_utf8_lossy(head);

    let declared = extract_charset(&head_str).or_else(|| extract_content_type_charset(&head_str));
    declared
        .and_then(|charset| Encoding::for_label(charset.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Look up an encoding by its WHATWG label.
///
/// # Errors
///
/// Returns `Error::InvalidInput` when the label is unknown.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::InvalidInput(format!("unknown encoding label '{label}'")))
}

/// Extract charset from `<meta charset="...">` tag.
fn extract_charset(html: &str) -> Option<String> {
    CHARSET_META_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract charset from `<meta http-equiv="Content-Type" content="...; charset=...">` tag.
fn extract_content_type_charset(html: &str) -> Option<String> {
    CONTENT_TYPE_CHARSET_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decode bytes with a known encoding.
///
/// With `strict` set, malformed sequences are an error; otherwise they are
/// replaced with U+FFFD.
///
/// # Errors
///
/// Returns `Error::InvalidInput` when `strict` is set and the input is not
/// valid in `encoding`.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, strict: bool) -> Result<String> {
    if strict {
        let body = match Encoding::for_bom(bytes) {
            Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
            _ => bytes,
        };
        return encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(Cow::into_owned)
            .ok_or_else(|| {
                Error::InvalidInput(format!("malformed {} byte sequence", encoding.name()))
            });
    }

    let (decoded, _encoding_used, _had_errors) = encoding.decode(bytes);
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_utf8_from_meta_charset() {
        let html = br#"<html><head><meta charset="utf-8"></head><body>Test</body></html>"#;
        assert_eq!(detect_encoding(html), UTF_8);
    }

    #[test]
    fn detect_iso88591_from_meta_charset() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // encoding_rs maps ISO-8859-1 to windows-1252 per WHATWG
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detect_charset_from_content_type() {
        let html = br#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1"></head></html>"#;
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detect_encoding_from_bom() {
        let html = b"\xFE\xFF\x00<\x00p\x00>";
        assert_eq!(detect_encoding(html).name(), "UTF-16BE");
    }

    #[test]
    fn default_to_utf8_when_no_charset() {
        assert_eq!(detect_encoding(b"<html><body>Test</body></html>"), UTF_8);
    }

    #[test]
    fn unknown_label_is_invalid_input() {
        let err = encoding_for_label("no-such-charset").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn label_lookup_trims_whitespace() {
        let encoding = encoding_for_label(" Shift_JIS ").unwrap();
        assert_eq!(encoding.name(), "Shift_JIS");
    }

    #[test]
    fn lossy_decode_replaces_malformed_bytes() {
        let decoded = decode(b"Test \xFF Invalid", UTF_8, false).unwrap();
        assert!(decoded.contains('\u{FFFD}'));
        assert!(decoded.contains("Invalid"));
    }

    #[test]
    fn strict_decode_rejects_malformed_bytes() {
        let err = decode(b"Test \xFF Invalid", UTF_8, true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn strict_decode_skips_matching_bom() {
        let decoded = decode(b"\xEF\xBB\xBF<p>ok</p>", UTF_8, true).unwrap();
        assert_eq!(decoded, "<p>ok</p>");
    }

    #[test]
    fn extract_charset_case_insensitive() {
        let html = "<HTML><HEAD><META CHARSET=\"UTF-8\"></HEAD></HTML>";
        assert_eq!(extract_charset(html), Some("UTF-8".to_string()));
    }

    #[test]
    fn extract_content_type_charset_standard() {
        let html = r#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#;
        assert_eq!(extract_content_type_charset(html), Some("ISO-8859-1".to_string()));
    }
}
