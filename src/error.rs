//! Error types for markup-nav.
//!
//! Searching never fails: an absent match is `None` or an empty `Vec`.
//! Only document construction and query evaluation return errors.

use crate::xpath::QueryError;

/// Error type for document construction and query operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input buffer was empty.
    #[error("Empty input")]
    EmptyInput,

    /// The input cannot be read as the requested document kind
    /// (unknown encoding label, malformed bytes under strict decoding).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parsing produced a tree without any element.
    #[error("No root element found")]
    NoRootElement,

    /// The source could not be read.
    #[error("Unreadable source: {0}")]
    Unreadable(#[from] std::io::Error),

    /// A query expression was malformed or did not select nodes.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// Result type alias for markup-nav operations.
pub type Result<T> = std::result::Result<T, Error>;
