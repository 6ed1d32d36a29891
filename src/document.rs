//! Parsed documents.
//!
//! A [`Document`] owns the tree produced by `dom_query` and hands out
//! [`Node`] handles that borrow from it. Construction is all-or-nothing:
//! either every check passes and a usable tree exists, or an [`Error`] is
//! returned.

use std::fmt;
use std::io::Read;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::encoding::{decode, detect_encoding, encoding_for_label};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::options::{DocumentKind, Options};

/// A parsed HTML document or fragment.
pub struct Document {
    inner: dom_query::Document,
    kind: DocumentKind,
    encoding: &'static Encoding,
}

impl Document {
    /// Parses a full HTML document with default options.
    ///
    /// # Example
    ///
    /// ```rust
    /// use markup_nav::Document;
    ///
    /// let doc = Document::parse("<html><head><title>Hi</title></head><body></body></html>")?;
    /// assert_eq!(doc.title().as_deref(), Some("Hi"));
    /// # Ok::<(), markup_nav::Error>(())
    /// ```
    pub fn parse(html: &str) -> Result<Self> {
        Self::parse_with_options(html, &Options::default())
    }

    /// Parses text already decoded to UTF-8.
    ///
    /// `options.encoding` and `options.strict_encoding` only apply to byte
    /// input and are ignored here.
    pub fn parse_with_options(html: &str, options: &Options) -> Result<Self> {
        Self::build(html, UTF_8, options)
    }

    /// Parses raw bytes with default options, sniffing the encoding.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse_bytes_with_options(bytes, &Options::default())
    }

    /// Parses raw bytes, decoding them with the requested or sniffed encoding.
    pub fn parse_bytes_with_options(bytes: &[u8], options: &Options) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyInput);
        }
        let encoding = match options.encoding.as_deref() {
            Some(label) => encoding_for_label(label)?,
            None => detect_encoding(bytes),
        };
        let text = decode(bytes, encoding, options.strict_encoding)?;
        Self::build(&text, encoding, options)
    }

    /// Reads and parses everything from `reader`.
    pub fn from_reader<R: Read>(mut reader: R, options: &Options) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse_bytes_with_options(&bytes, options)
    }

    /// Reads and parses the file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "read document from file");
        Self::parse_bytes_with_options(&bytes, options)
    }

    fn build(text: &str, encoding: &'static Encoding, options: &Options) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let inner = match options.kind {
            DocumentKind::Document => dom_query::Document::from(text),
            DocumentKind::Fragment => dom_query::Document::fragment(text),
        };
        let document = Self {
            inner,
            kind: options.kind,
            encoding,
        };

        if options.require_root && document.root().is_none() {
            return Err(Error::NoRootElement);
        }

        debug!(
            len = text.len(),
            encoding = encoding.name(),
            kind = ?options.kind,
            "parsed document"
        );
        Ok(document)
    }

    /// The node above the root element.
    #[must_use]
    pub fn document_node(&self) -> Node<'_> {
        Node::new(self.inner.root())
    }

    /// The root element.
    ///
    /// For documents this is `html`. For fragments it is the first top-level
    /// element of the input, or `None` when the fragment has no element.
    #[must_use]
    pub fn root(&self) -> Option<Node<'_>> {
        let first = self.document_node().element_children().next()?;
        match self.kind {
            DocumentKind::Document => Some(first),
            DocumentKind::Fragment if first.has_tag("html") => first.element_children().next(),
            DocumentKind::Fragment => Some(first),
        }
    }

    /// The `head` element. Always `None` for fragments.
    #[must_use]
    pub fn head(&self) -> Option<Node<'_>> {
        self.top_level("head")
    }

    /// The `body` element. Always `None` for fragments.
    #[must_use]
    pub fn body(&self) -> Option<Node<'_>> {
        self.top_level("body")
    }

    fn top_level(&self, tag: &str) -> Option<Node<'_>> {
        match self.kind {
            DocumentKind::Document => self.root()?.child_of_tag(tag),
            DocumentKind::Fragment => None,
        }
    }

    /// Trimmed text of `head > title`.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.head()?
            .child_of_tag("title")
            .map(|title| title.text_content())
    }

    /// Serialized markup of the whole tree.
    #[must_use]
    pub fn html(&self) -> String {
        self.inner.html().to_string()
    }

    /// Encoding the input was decoded from.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The underlying `dom_query` document.
    #[must_use]
    pub fn as_dom(&self) -> &dom_query::Document {
        &self.inner
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("kind", &self.kind)
            .field("encoding", &self.encoding.name())
            .finish_non_exhaustive()
    }
}
