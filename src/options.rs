//! Configuration options for document loading.
//!
//! The `Options` struct controls how raw bytes become a parsed tree:
//! which encoding to assume, whether to parse a full document or a
//! fragment, and how strictly to treat malformed input.

/// How the input markup is parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentKind {
    /// A full HTML document. The parser synthesizes `html`, `head` and
    /// `body` when they are missing.
    #[default]
    Document,

    /// An HTML fragment. No implied `head`/`body` are created, so the input
    /// may legitimately contain no element at all.
    Fragment,
}

/// Configuration options for document loading.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use markup_nav::{DocumentKind, Options};
///
/// // Use defaults
/// let options = Options::default();
///
/// // Customize specific fields
/// let options = Options {
///     encoding: Some("windows-1252".to_string()),
///     kind: DocumentKind::Fragment,
///     ..Options::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Encoding label (WHATWG names such as `utf-8`, `iso-8859-1`, `shift_jis`).
    ///
    /// When `None`, the encoding is sniffed from `<meta charset>` declarations
    /// and falls back to UTF-8.
    ///
    /// Default: `None`
    pub encoding: Option<String>,

    /// Parse as a full document or as a fragment.
    ///
    /// Default: `DocumentKind::Document`
    pub kind: DocumentKind,

    /// Reject byte sequences that are malformed in the chosen encoding
    /// instead of replacing them with U+FFFD.
    ///
    /// Default: `false`
    pub strict_encoding: bool,

    /// Fail with `Error::NoRootElement` when the parsed tree contains no
    /// element.
    ///
    /// Default: `true`
    pub require_root: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            encoding: None,
            kind: DocumentKind::Document,
            strict_encoding: false,
            require_root: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert!(options.encoding.is_none());
        assert_eq!(options.kind, DocumentKind::Document);
        assert!(!options.strict_encoding);
        assert!(options.require_root);
    }

    #[test]
    fn test_struct_update_overrides_selected_fields_only() {
        let options = Options {
            strict_encoding: true,
            ..Options::default()
        };
        assert!(options.strict_encoding);
        assert!(options.require_root);
        assert_eq!(options.kind, DocumentKind::Document);
    }
}
