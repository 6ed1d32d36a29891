//! XPath queries over node handles.
//!
//! Expressions are compiled once into a [`Query`] and evaluated against a
//! node. Failures come back as a [`QueryError`] value from each call.
//!
//! # Context
//!
//! An expression beginning with `.` (search from this node) or `//` (search
//! the whole document) is evaluated with the calling node as context. Any
//! other expression is evaluated with the document node as context, so
//! `count(//p)` or `html/body` read the same from every node.
//!
//! ```
//! use markup_nav::Document;
//!
//! let doc = Document::parse(r#"<div><a href="/x">x</a><a>y</a></div>"#)?;
//! let div = doc.root().unwrap().descendant_of_tag("div").unwrap();
//!
//! let links = div.nodes_for_query(".//a[@href]")?;
//! assert_eq!(links.len(), 1);
//!
//! let err = div.nodes_for_query("//a[@href").unwrap_err();
//! assert_eq!(err.code(), 1206);
//! # Ok::<(), markup_nav::Error>(())
//! ```
//!
//! # Known Limitations
//!
//! - Variables are never bound; referencing one is `UndefVariable`.
//! - Namespace prefixes are not bound and the `namespace` axis is empty.
//! - `id()` and `lang()` are not provided.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod template;
pub mod value;

pub use error::{QueryError, QueryErrorCode, QueryResult};
pub use eval::Evaluator;
pub use template::{quote_literal, QueryTemplate};
pub use value::Value;

use tracing::{debug, trace};

use crate::node::Node;
use crate::predicate::MatchMode;
use ast::Expr;

/// Which node an expression is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryScope {
    /// The calling node.
    Relative,
    /// The document node of the calling node's tree.
    Document,
}

impl QueryScope {
    /// Scope implied by the expression's leading characters.
    #[must_use]
    pub fn of(expression: &str) -> Self {
        let head = expression.trim_start();
        if head.starts_with('.') || head.starts_with("//") {
            Self::Relative
        } else {
            Self::Document
        }
    }
}

/// A compiled expression.
#[derive(Debug, Clone)]
pub struct Query {
    source: String,
    scope: QueryScope,
    expr: Expr,
}

impl Query {
    /// Parses `expression`.
    pub fn compile(expression: &str) -> QueryResult<Self> {
        let expr = parser::parse(expression)?;
        trace!(expression, ?expr, "compiled query");
        Ok(Self {
            source: expression.to_string(),
            scope: QueryScope::of(expression),
            expr,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn scope(&self) -> QueryScope {
        self.scope
    }

    /// Evaluates against `origin`, returning any value type.
    pub fn evaluate<'a>(&self, origin: &Node<'a>) -> QueryResult<Value<'a>> {
        let context = match self.scope {
            QueryScope::Relative => *origin,
            QueryScope::Document => origin.owner_document(),
        };
        Evaluator::new(origin).evaluate(&self.expr, context)
    }

    /// Evaluates against `origin`, requiring a node-set.
    pub fn select<'a>(&self, origin: &Node<'a>) -> QueryResult<Vec<Node<'a>>> {
        let result = self.evaluate(origin).and_then(|value| {
            value.into_nodes().map_err(|other| {
                QueryError::new(
                    QueryErrorCode::InvalidType,
                    format!("expression yields a {}, not a node-set", other.type_name()),
                    0,
                )
            })
        });
        match &result {
            Ok(nodes) => debug!(
                expression = %self.source,
                scope = ?self.scope,
                results = nodes.len(),
                "evaluated query"
            ),
            Err(err) => debug!(
                expression = %self.source,
                code = err.code(),
                error = %err,
                "query failed"
            ),
        }
        result
    }

    /// First selected node in document order.
    pub fn select_first<'a>(&self, origin: &Node<'a>) -> QueryResult<Option<Node<'a>>> {
        Ok(self.select(origin)?.into_iter().next())
    }
}

/// Parses and evaluates `expression` against `origin`.
pub fn evaluate<'a>(origin: &Node<'a>, expression: &str) -> QueryResult<Value<'a>> {
    Query::compile(expression)?.evaluate(origin)
}

impl<'a> Node<'a> {
    /// Nodes selected by `expression`, in document order.
    pub fn nodes_for_query(&self, expression: &str) -> QueryResult<Vec<Node<'a>>> {
        Query::compile(expression)?.select(self)
    }

    /// First node selected by `expression`.
    pub fn node_for_query(&self, expression: &str) -> QueryResult<Option<Node<'a>>> {
        Query::compile(expression)?.select_first(self)
    }

    fn template_nodes(&self, template: QueryTemplate<'_>) -> QueryResult<Vec<Node<'a>>> {
        self.nodes_for_query(&template.expression()?)
    }

    fn template_node(&self, template: QueryTemplate<'_>) -> QueryResult<Option<Node<'a>>> {
        self.node_for_query(&template.expression()?)
    }

    /// First descendant with tag `tag`.
    pub fn node_of_tag(&self, tag: &str) -> QueryResult<Option<Node<'a>>> {
        self.template_node(QueryTemplate::OfTag(tag))
    }

    /// Every descendant with tag `tag`, in document order.
    pub fn nodes_of_tag(&self, tag: &str) -> QueryResult<Vec<Node<'a>>> {
        self.template_nodes(QueryTemplate::OfTag(tag))
    }

    /// First descendant `tag` carrying `attribute`.
    pub fn node_of_tag_with_attribute(&self, tag: &str, attribute: &str) -> QueryResult<Option<Node<'a>>> {
        self.template_node(QueryTemplate::TagWithAttribute { tag, attribute })
    }

    /// Every descendant `tag` carrying `attribute`.
    pub fn nodes_of_tag_with_attribute(&self, tag: &str, attribute: &str) -> QueryResult<Vec<Node<'a>>> {
        self.template_nodes(QueryTemplate::TagWithAttribute { tag, attribute })
    }

    /// First descendant carrying `attribute`.
    pub fn node_with_attribute(&self, attribute: &str) -> QueryResult<Option<Node<'a>>> {
        self.template_node(QueryTemplate::WithAttribute(attribute))
    }

    /// Every descendant carrying `attribute`.
    pub fn nodes_with_attribute(&self, attribute: &str) -> QueryResult<Vec<Node<'a>>> {
        self.template_nodes(QueryTemplate::WithAttribute(attribute))
    }

    /// First descendant whose `attribute` equals `value`.
    pub fn node_with_attribute_value(&self, attribute: &str, value: &str) -> QueryResult<Option<Node<'a>>> {
        self.node_with_attribute_value_matching(attribute, MatchMode::Equals, value)
    }

    /// Every descendant whose `attribute` equals `value`.
    pub fn nodes_with_attribute_value(&self, attribute: &str, value: &str) -> QueryResult<Vec<Node<'a>>> {
        self.nodes_with_attribute_value_matching(attribute, MatchMode::Equals, value)
    }

    /// First descendant whose `attribute` satisfies `mode` against `value`.
    pub fn node_with_attribute_value_matching(
        &self,
        attribute: &str,
        mode: MatchMode,
        value: &str,
    ) -> QueryResult<Option<Node<'a>>> {
        self.template_node(QueryTemplate::AttributeValue {
            attribute,
            mode,
            value,
        })
    }

    /// Every descendant whose `attribute` satisfies `mode` against `value`.
    pub fn nodes_with_attribute_value_matching(
        &self,
        attribute: &str,
        mode: MatchMode,
        value: &str,
    ) -> QueryResult<Vec<Node<'a>>> {
        self.template_nodes(QueryTemplate::AttributeValue {
            attribute,
            mode,
            value,
        })
    }

    /// First descendant whose whole `class` attribute equals `class`.
    pub fn node_with_class(&self, class: &str) -> QueryResult<Option<Node<'a>>> {
        self.template_node(QueryTemplate::WithClass(class))
    }

    /// Every descendant whose whole `class` attribute equals `class`.
    pub fn nodes_with_class(&self, class: &str) -> QueryResult<Vec<Node<'a>>> {
        self.template_nodes(QueryTemplate::WithClass(class))
    }
}
