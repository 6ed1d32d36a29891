//! Expression values and their conversions.

use std::fmt;

use crate::node::Node;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// Nodes in document order, without duplicates.
    NodeSet(Vec<Node<'a>>),
    Boolean(bool),
    Number(f64),
    String(String),
}

impl<'a> Value<'a> {
    /// Name used in type errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NodeSet(_) => "node-set",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// `boolean()` conversion.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::NodeSet(nodes) => !nodes.is_empty(),
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    /// `number()` conversion.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::NodeSet(nodes) => nodes
                .first()
                .map_or(f64::NAN, |node| string_to_number(&node_string(node))),
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
        }
    }

    /// `string()` conversion.
    #[must_use]
    pub fn to_string_value(&self) -> String {
        match self {
            Self::NodeSet(nodes) => nodes.first().map(node_string).unwrap_or_default(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.clone(),
        }
    }

    /// Consumes the value, returning its nodes if it is a node-set.
    pub fn into_nodes(self) -> Result<Vec<Node<'a>>, Self> {
        match self {
            Self::NodeSet(nodes) => Ok(nodes),
            other => Err(other),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_value())
    }
}

/// String-value of a node: concatenated descendant text for elements and
/// documents, the value for attributes, the content for text and comments.
#[must_use]
pub fn node_string(node: &Node<'_>) -> String {
    node.raw_text_content().to_string()
}

/// XPath number parsing: optional minus, digits with an optional fraction,
/// surrounded by whitespace. Anything else is NaN.
#[must_use]
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'));
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let well_formed = !unsigned.is_empty()
        && unsigned != "."
        && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && unsigned.bytes().filter(|&b| b == b'.').count() <= 1;
    if !well_formed {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

/// XPath number formatting: integers without a fraction, no exponent.
#[must_use]
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}
