//! Compiled regex patterns.
//!
//! All patterns are compiled once at first use using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Charset Detection
// =============================================================================

/// Match `<meta charset="...">` tag.
pub static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("CHARSET_META_RE regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag.
pub static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#)
        .expect("CONTENT_TYPE_CHARSET_RE regex")
});

// =============================================================================
// Text Normalization
// =============================================================================

/// Runs of whitespace (including newlines) collapsed to a single space.
pub static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

/// Leading signed integer, as read by `integer_value`.
pub static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+").expect("LEADING_INTEGER regex"));

/// Leading signed decimal with optional exponent, as read by `double_value`.
pub static LEADING_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("LEADING_DECIMAL regex")
});

/// Collapse whitespace runs to single spaces and trim both ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b   c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_charset_meta_stops_at_semicolon() {
        let caps = CHARSET_META_RE.captures(r#"<meta charset=utf-8;>"#).unwrap();
        assert_eq!(&caps[1], "utf-8");
    }

    #[test]
    fn test_leading_decimal() {
        assert_eq!(LEADING_DECIMAL.find("-12.5e2px").unwrap().as_str(), "-12.5e2");
        assert_eq!(LEADING_DECIMAL.find(".5").unwrap().as_str(), ".5");
        assert!(LEADING_DECIMAL.find("abc").is_none());
    }
}
