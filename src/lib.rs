//! # markup-nav
//!
//! Node-oriented navigation, predicate search and XPath queries over parsed
//! HTML trees.
//!
//! A [`Document`] owns a tree parsed by `dom_query`. Every [`Node`] handed out
//! borrows from it, so handles cannot outlive the tree they point into.
//!
//! ## Quick Start
//!
//! ```rust
//! use markup_nav::Document;
//!
//! let html = r#"<html><body><div class="a"><p id="x">Hi</p><p>Bye</p></div></body></html>"#;
//! let doc = Document::parse(html)?;
//! let root = doc.root().unwrap();
//!
//! // Scoped search
//! let first = root.descendant_with_id("x").unwrap();
//! assert_eq!(first.text_content(), "Hi");
//!
//! let div = root.descendant_with_class("a").unwrap();
//! let texts: Vec<_> = div.children_of_tag("p").iter().map(|p| p.text_content()).collect();
//! assert_eq!(texts, ["Hi", "Bye"]);
//!
//! // XPath
//! let bye = root.node_for_query("//p[not(@id)]")?.unwrap();
//! assert_eq!(bye.string_value().as_deref(), Some("Bye"));
//! # Ok::<(), markup_nav::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Navigation**: parent, children, siblings, ancestors, lazy pre-order walks
//! - **Scoped search**: child, sibling and descendant scopes with equals,
//!   contains, begins-with, ends-with and presence predicates
//! - **XPath**: an XPath 1.0 evaluator with libxml2-compatible error codes
//! - **Values**: integers, locale-aware decimals and dates from leaf text
//! - **Loading**: strings, byte buffers with charset sniffing, readers, files

mod document;
mod error;
mod options;
mod patterns;

/// Node handles and their accessors.
pub mod node;

/// Lazy traversal over sibling, parent and subtree links.
pub mod iter;

/// Tag and attribute predicates.
pub mod predicate;

/// Child, sibling and descendant searches.
pub mod search;

/// XPath expression parsing and evaluation.
pub mod xpath;

/// Number and date interpretation of leaf text.
pub mod convert;

/// Character encoding detection and transcoding.
pub mod encoding;

// Public API - re-exports
pub use document::Document;
pub use error::{Error, Result};
pub use node::{Node, NodeKind};
pub use options::{DocumentKind, Options};
pub use predicate::{MatchMode, Predicate, Target};
pub use search::Scope;
pub use xpath::{Query, QueryError, QueryErrorCode, QueryScope, QueryTemplate};
