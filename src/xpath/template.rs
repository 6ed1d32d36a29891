//! Expression templates for the common predicate shapes.
//!
//! Every template searches the context node's descendants (`.//`), so its
//! result matches the recursive descendant search for the same predicate.

use std::fmt;

use super::error::{QueryError, QueryErrorCode, QueryResult};
use super::lexer::is_ncname;
use crate::predicate::MatchMode;

/// A query built from a tag and/or attribute condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTemplate<'q> {
    /// `.//tag`
    OfTag(&'q str),
    /// `.//tag[@attribute]`
    TagWithAttribute { tag: &'q str, attribute: &'q str },
    /// `.//*[@attribute]`
    WithAttribute(&'q str),
    /// `.//*[@attribute …value]` under `mode`.
    AttributeValue {
        attribute: &'q str,
        mode: MatchMode,
        value: &'q str,
    },
    /// `.//*[@class='class']`
    WithClass(&'q str),
}

impl QueryTemplate<'_> {
    /// The expression text.
    ///
    /// Tag and attribute names are written into the expression as-is, so
    /// each must be a single unprefixed name; anything else is an
    /// `ExprError`.
    pub fn expression(&self) -> QueryResult<String> {
        for name in self.names() {
            if !is_ncname(name) {
                return Err(QueryError::new(
                    QueryErrorCode::ExprError,
                    format!("'{name}' is not a valid tag or attribute name"),
                    0,
                ));
            }
        }
        Ok(self.to_string())
    }

    fn names(&self) -> Vec<&str> {
        match *self {
            Self::OfTag(tag) => vec![tag],
            Self::TagWithAttribute { tag, attribute } => vec![tag, attribute],
            Self::WithAttribute(attribute) | Self::AttributeValue { attribute, .. } => vec![attribute],
            Self::WithClass(_) => Vec::new(),
        }
    }
}

impl fmt::Display for QueryTemplate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OfTag(tag) => write!(f, ".//{tag}"),
            Self::TagWithAttribute { tag, attribute } => write!(f, ".//{tag}[@{attribute}]"),
            Self::WithAttribute(attribute) => write!(f, ".//*[@{attribute}]"),
            Self::WithClass(class) => write!(f, ".//*[@class={}]", quote_literal(class)),
            Self::AttributeValue {
                attribute: a,
                mode,
                value,
            } => {
                let v = quote_literal(value);
                match mode {
                    MatchMode::Equals => write!(f, ".//*[@{a}={v}]"),
                    MatchMode::Contains => write!(f, ".//*[@{a} and contains(@{a}, {v})]"),
                    MatchMode::BeginsWith => write!(f, ".//*[@{a} and starts-with(@{a}, {v})]"),
                    MatchMode::EndsWith => write!(
                        f,
                        ".//*[@{a} and substring(@{a}, string-length(@{a}) - string-length({v}) + 1) = {v}]"
                    ),
                    MatchMode::Exists => write!(f, ".//*[@{a}]"),
                }
            }
        }
    }
}

/// Quotes `value` as a string literal.
///
/// Literals cannot escape quotes, so a value holding both kinds becomes a
/// `concat()` of single-quoted pieces and `"'"`.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|piece| format!("'{piece}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("plain"), "'plain'");
        assert_eq!(quote_literal("it's"), "\"it's\"");
        assert_eq!(quote_literal(r#"a'b"c"#), r#"concat('a', "'", 'b"c')"#);
    }

    #[test]
    fn test_templates() {
        assert_eq!(QueryTemplate::OfTag("p").expression().unwrap(), ".//p");
        assert_eq!(
            QueryTemplate::TagWithAttribute { tag: "a", attribute: "href" }.expression().unwrap(),
            ".//a[@href]"
        );
        assert_eq!(QueryTemplate::WithClass("x y").expression().unwrap(), ".//*[@class='x y']");
        assert_eq!(
            QueryTemplate::AttributeValue {
                attribute: "href",
                mode: MatchMode::BeginsWith,
                value: "https://",
            }
            .expression()
            .unwrap(),
            ".//*[@href and starts-with(@href, 'https://')]"
        );
    }

    #[test]
    fn test_templates_parse() {
        use crate::xpath::parser::parse;
        for mode in [
            MatchMode::Equals,
            MatchMode::Contains,
            MatchMode::BeginsWith,
            MatchMode::EndsWith,
            MatchMode::Exists,
        ] {
            let template = QueryTemplate::AttributeValue {
                attribute: "data-x",
                mode,
                value: r#"it's "quoted""#,
            };
            assert!(parse(&template.expression().unwrap()).is_ok(), "{template}");
        }
    }

    #[test]
    fn test_names_are_checked() {
        let err = QueryTemplate::WithAttribute("id] | //*[@x").expression().unwrap_err();
        assert_eq!(err.kind(), QueryErrorCode::ExprError);
        assert!(QueryTemplate::OfTag("*").expression().is_err());
        assert!(QueryTemplate::TagWithAttribute { tag: "a", attribute: "" }.expression().is_err());
        assert!(QueryTemplate::WithClass("] weird [").expression().is_ok());
    }
}
