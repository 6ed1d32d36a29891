//! Query errors.
//!
//! Error numbers follow libxml2's XPath table (`XML_XPATH_*` in the
//! `XML_FROM_XPATH` domain), so a code seen here means the same thing as the
//! code libxml2 would report for the same expression.

use std::fmt;

/// Base of the XPath error domain.
pub const XPATH_ERROR_BASE: i32 = 1200;

/// Kind of query failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorCode {
    ExprOk,
    Number,
    UnfinishedLiteral,
    StartLiteral,
    VariableRef,
    UndefVariable,
    InvalidPredicate,
    ExprError,
    Unclosed,
    UnknownFunc,
    InvalidOperand,
    InvalidType,
    InvalidArity,
    InvalidCtxtSize,
    InvalidCtxtPosition,
    Memory,
    UndefPrefix,
    Encoding,
    InvalidChar,
}

impl QueryErrorCode {
    /// Position in the XPath error table.
    #[must_use]
    pub fn offset(self) -> i32 {
        match self {
            Self::ExprOk => 0,
            Self::Number => 1,
            Self::UnfinishedLiteral => 2,
            Self::StartLiteral => 3,
            Self::VariableRef => 4,
            Self::UndefVariable => 5,
            Self::InvalidPredicate => 6,
            Self::ExprError => 7,
            Self::Unclosed => 8,
            Self::UnknownFunc => 9,
            Self::InvalidOperand => 10,
            Self::InvalidType => 11,
            Self::InvalidArity => 12,
            Self::InvalidCtxtSize => 13,
            Self::InvalidCtxtPosition => 14,
            Self::Memory => 15,
            Self::UndefPrefix => 19,
            Self::Encoding => 20,
            Self::InvalidChar => 21,
        }
    }

    /// Numeric code in the XPath error domain.
    #[must_use]
    pub fn code(self) -> i32 {
        XPATH_ERROR_BASE + self.offset()
    }

    /// Short description of the code.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ExprOk => "Ok",
            Self::Number => "Number encoding",
            Self::UnfinishedLiteral => "Unfinished literal",
            Self::StartLiteral => "Start of literal",
            Self::VariableRef => "Expected $ for variable reference",
            Self::UndefVariable => "Undefined variable",
            Self::InvalidPredicate => "Invalid predicate",
            Self::ExprError => "Invalid expression",
            Self::Unclosed => "Missing closing curly brace",
            Self::UnknownFunc => "Unregistered function",
            Self::InvalidOperand => "Invalid operand",
            Self::InvalidType => "Invalid type",
            Self::InvalidArity => "Invalid number of arguments",
            Self::InvalidCtxtSize => "Invalid context size",
            Self::InvalidCtxtPosition => "Invalid context position",
            Self::Memory => "Memory allocation error",
            Self::UndefPrefix => "Undefined namespace prefix",
            Self::Encoding => "Encoding error",
            Self::InvalidChar => "Char out of XML range",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A malformed expression or an evaluation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("XPath error {} ({kind}) at position {position}: {message}", .kind.code())]
pub struct QueryError {
    kind: QueryErrorCode,
    message: String,
    position: usize,
}

impl QueryError {
    #[must_use]
    pub fn new(kind: QueryErrorCode, message: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }

    /// Numeric error code (1200 + XPath error number).
    #[must_use]
    pub fn code(&self) -> i32 {
        self.kind.code()
    }

    #[must_use]
    pub fn kind(&self) -> QueryErrorCode {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Byte offset in the expression where the error was detected.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_xpath_table() {
        assert_eq!(QueryErrorCode::ExprOk.code(), 1200);
        assert_eq!(QueryErrorCode::InvalidPredicate.code(), 1206);
        assert_eq!(QueryErrorCode::ExprError.code(), 1207);
        assert_eq!(QueryErrorCode::InvalidType.code(), 1211);
        assert_eq!(QueryErrorCode::InvalidChar.code(), 1221);
    }

    #[test]
    fn test_display_carries_code_and_position() {
        let err = QueryError::new(QueryErrorCode::UnknownFunc, "no function 'foo'", 4);
        let text = err.to_string();
        assert!(text.contains("1209"));
        assert!(text.contains("position 4"));
        assert!(text.contains("no function 'foo'"));
    }
}
