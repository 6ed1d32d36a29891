//! Expression evaluation against a parsed tree.
//!
//! Node-sets are kept in document order without duplicates after every
//! step, union and filter. Axis results are numbered in axis order for
//! positional predicates, so `preceding-sibling::*[1]` is the nearest one.
//! Sorting uses a pre-order rank of every node in the tree, built on first
//! need and reused for the rest of the evaluation.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::iter;

use dom_query::NodeId;

use super::ast::{Axis, BinaryOp, Expr, Function, LocationPath, NodeTest, Step};
use super::error::{QueryError, QueryErrorCode, QueryResult};
use super::value::{node_string, string_to_number, Value};
use crate::node::{Node, NodeKind};

/// Context of one evaluation: the node plus its position in the current
/// node list.
#[derive(Debug, Clone, Copy)]
struct Focus<'a> {
    node: Node<'a>,
    position: usize,
    size: usize,
}

/// Tree position of a node: its arena id plus the attribute index for
/// attribute nodes.
type RankKey = (NodeId, Option<usize>);

fn rank_key(node: &Node<'_>) -> RankKey {
    (node.node_id(), node.attribute_index())
}

/// Evaluates parsed expressions over one tree.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    root: Node<'a>,
    ranks: OnceCell<HashMap<RankKey, usize>>,
}

impl<'a> Evaluator<'a> {
    /// Evaluator for the tree containing `node`.
    #[must_use]
    pub fn new(node: &Node<'a>) -> Self {
        Self {
            root: node.owner_document(),
            ranks: OnceCell::new(),
        }
    }

    /// Evaluates `expr` with `context` as the context node.
    pub fn evaluate(&self, expr: &Expr, context: Node<'a>) -> QueryResult<Value<'a>> {
        self.eval(
            expr,
            Focus {
                node: context,
                position: 1,
                size: 1,
            },
        )
    }

    fn eval(&self, expr: &Expr, focus: Focus<'a>) -> QueryResult<Value<'a>> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Literal(s) => Ok(Value::String(s.clone())),
            Expr::Variable(name, position) => Err(QueryError::new(
                QueryErrorCode::UndefVariable,
                format!("variable '${name}' is not defined"),
                *position,
            )),
            Expr::Negate(inner) => Ok(Value::Number(-self.eval(inner, focus)?.to_number())),
            Expr::Binary(left, op, right) => self.eval_binary(left, *op, right, focus),
            Expr::Union(left, right) => {
                let mut nodes = self.eval_nodes(left, focus, "|")?;
                nodes.extend(self.eval_nodes(right, focus, "|")?);
                Ok(Value::NodeSet(self.document_order(nodes)))
            }
            Expr::Path(path) => self.eval_path(path, focus).map(Value::NodeSet),
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let mut nodes = self.eval_nodes(primary, focus, "a filter")?;
                for predicate in predicates {
                    nodes = self.filter(nodes, predicate)?;
                }
                self.apply_steps(nodes, steps).map(Value::NodeSet)
            }
            Expr::Call(function, args) => self.call(*function, args, focus),
        }
    }

    /// Evaluates `expr`, requiring a node-set.
    fn eval_nodes(&self, expr: &Expr, focus: Focus<'a>, usage: &str) -> QueryResult<Vec<Node<'a>>> {
        self.eval(expr, focus)?.into_nodes().map_err(|other| {
            QueryError::new(
                QueryErrorCode::InvalidType,
                format!("{usage} needs a node-set, got a {}", other.type_name()),
                0,
            )
        })
    }

    fn eval_binary(&self, left: &Expr, op: BinaryOp, right: &Expr, focus: Focus<'a>) -> QueryResult<Value<'a>> {
        match op {
            BinaryOp::Or => {
                let value = self.eval(left, focus)?.to_boolean() || self.eval(right, focus)?.to_boolean();
                Ok(Value::Boolean(value))
            }
            BinaryOp::And => {
                let value = self.eval(left, focus)?.to_boolean() && self.eval(right, focus)?.to_boolean();
                Ok(Value::Boolean(value))
            }
            op if op.is_comparison() => {
                let lhs = self.eval(left, focus)?;
                let rhs = self.eval(right, focus)?;
                Ok(Value::Boolean(compare(op, &lhs, &rhs)))
            }
            op => {
                let a = self.eval(left, focus)?.to_number();
                let b = self.eval(right, focus)?.to_number();
                let n = match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Subtract => a - b,
                    BinaryOp::Multiply => a * b,
                    BinaryOp::Divide => a / b,
                    _ => a % b,
                };
                Ok(Value::Number(n))
            }
        }
    }

    fn eval_path(&self, path: &LocationPath, focus: Focus<'a>) -> QueryResult<Vec<Node<'a>>> {
        let start = if path.absolute { self.root } else { focus.node };
        self.apply_steps(vec![start], &path.steps)
    }

    fn apply_steps(&self, mut nodes: Vec<Node<'a>>, steps: &[Step]) -> QueryResult<Vec<Node<'a>>> {
        for step in steps {
            nodes = self.apply_step(&nodes, step)?;
        }
        Ok(nodes)
    }

    fn apply_step(&self, input: &[Node<'a>], step: &Step) -> QueryResult<Vec<Node<'a>>> {
        let mut output = Vec::new();
        for node in input {
            let mut selected: Vec<Node<'a>> = axis_nodes(node, step.axis)
                .into_iter()
                .filter(|candidate| test_matches(candidate, &step.test, step.axis))
                .collect();
            for predicate in &step.predicates {
                selected = self.filter(selected, predicate)?;
            }
            output.extend(selected);
        }

        // A single context node yields its axis in order already.
        if input.len() == 1 {
            if step.axis.is_reverse() {
                output.reverse();
            }
            return Ok(output);
        }
        Ok(self.document_order(output))
    }

    /// Keeps the nodes satisfying `predicate`, numbering them in list order.
    fn filter(&self, nodes: Vec<Node<'a>>, predicate: &Expr) -> QueryResult<Vec<Node<'a>>> {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (index, node) in nodes.into_iter().enumerate() {
            let position = index + 1;
            let focus = Focus { node, position, size };
            let keep = match self.eval(predicate, focus)? {
                Value::Number(n) => n == position as f64,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    fn call(&self, function: Function, args: &[Expr], focus: Focus<'a>) -> QueryResult<Value<'a>> {
        let string_arg = |index: usize| -> QueryResult<String> {
            match args.get(index) {
                Some(arg) => Ok(self.eval(arg, focus)?.to_string_value()),
                None => Ok(node_string(&focus.node)),
            }
        };
        let number_arg = |index: usize| -> QueryResult<f64> {
            match args.get(index) {
                Some(arg) => Ok(self.eval(arg, focus)?.to_number()),
                None => Ok(string_to_number(&node_string(&focus.node))),
            }
        };

        let value = match function {
            Function::Last => Value::Number(focus.size as f64),
            Function::Position => Value::Number(focus.position as f64),
            Function::Count => {
                let nodes = self.nodes_arg(args, focus, "count()")?;
                Value::Number(nodes.len() as f64)
            }
            Function::Name | Function::LocalName => {
                let node = match args.first() {
                    Some(_) => self.nodes_arg(args, focus, "name()")?.first().copied(),
                    None => Some(focus.node),
                };
                let name = node
                    .and_then(|n| n.tag_name().or_else(|| n.processing_instruction_target()))
                    .unwrap_or_default();
                let name = match function {
                    Function::LocalName => name.rsplit(':').next().unwrap_or_default().to_string(),
                    _ => name,
                };
                Value::String(name)
            }
            Function::String => Value::String(string_arg(0)?),
            Function::Concat => {
                let mut joined = String::new();
                for index in 0..args.len() {
                    joined.push_str(&string_arg(index)?);
                }
                Value::String(joined)
            }
            Function::StartsWith => Value::Boolean(string_arg(0)?.starts_with(&string_arg(1)?)),
            Function::EndsWith => Value::Boolean(string_arg(0)?.ends_with(&string_arg(1)?)),
            Function::Contains => Value::Boolean(string_arg(0)?.contains(&string_arg(1)?)),
            Function::SubstringBefore => {
                let (text, needle) = (string_arg(0)?, string_arg(1)?);
                let before = text.find(&needle).map(|i| &text[..i]).unwrap_or_default();
                Value::String(before.to_string())
            }
            Function::SubstringAfter => {
                let (text, needle) = (string_arg(0)?, string_arg(1)?);
                let after = text
                    .find(&needle)
                    .map(|i| &text[i + needle.len()..])
                    .unwrap_or_default();
                Value::String(after.to_string())
            }
            Function::Substring => {
                let text = string_arg(0)?;
                let start = round(number_arg(1)?);
                let end = match args.get(2) {
                    Some(_) => start + round(number_arg(2)?),
                    None => f64::INFINITY,
                };
                Value::String(substring(&text, start, end))
            }
            Function::StringLength => Value::Number(string_arg(0)?.chars().count() as f64),
            Function::NormalizeSpace => {
                let text = string_arg(0)?;
                let words: Vec<&str> = text.split(is_xml_space).filter(|w| !w.is_empty()).collect();
                Value::String(words.join(" "))
            }
            Function::Translate => {
                let (text, from, to) = (string_arg(0)?, string_arg(1)?, string_arg(2)?);
                Value::String(translate(&text, &from, &to))
            }
            Function::Boolean => Value::Boolean(self.eval(first_arg(args)?, focus)?.to_boolean()),
            Function::Not => Value::Boolean(!self.eval(first_arg(args)?, focus)?.to_boolean()),
            Function::True => Value::Boolean(true),
            Function::False => Value::Boolean(false),
            Function::Number => Value::Number(number_arg(0)?),
            Function::Sum => {
                let nodes = self.nodes_arg(args, focus, "sum()")?;
                Value::Number(nodes.iter().map(|n| string_to_number(&node_string(n))).sum())
            }
            Function::Floor => Value::Number(number_arg(0)?.floor()),
            Function::Ceiling => Value::Number(number_arg(0)?.ceil()),
            Function::Round => Value::Number(round(number_arg(0)?)),
        };
        Ok(value)
    }

    /// Pre-order rank of every node in the tree. An element ranks before
    /// its attributes, which rank before its children.
    fn ranks(&self) -> &HashMap<RankKey, usize> {
        self.ranks.get_or_init(|| {
            let mut ranks = HashMap::new();
            for node in iter::once(self.root).chain(self.root.descendants()) {
                ranks.insert(rank_key(&node), ranks.len());
                for attribute in node.attribute_nodes() {
                    ranks.insert(rank_key(&attribute), ranks.len());
                }
            }
            ranks
        })
    }

    /// Sorts into document order and drops duplicates.
    fn document_order(&self, mut nodes: Vec<Node<'a>>) -> Vec<Node<'a>> {
        let ranks = self.ranks();
        let rank = |node: &Node<'a>| ranks.get(&rank_key(node)).copied().unwrap_or(usize::MAX);
        if !nodes.is_sorted_by_key(rank) {
            nodes.sort_by_key(rank);
        }
        nodes.dedup();
        nodes
    }

    fn nodes_arg(&self, args: &[Expr], focus: Focus<'a>, usage: &str) -> QueryResult<Vec<Node<'a>>> {
        match args.first() {
            Some(arg) => self.eval_nodes(arg, focus, usage),
            None => Ok(vec![focus.node]),
        }
    }
}

fn first_arg(args: &[Expr]) -> QueryResult<&Expr> {
    args.first()
        .ok_or_else(|| QueryError::new(QueryErrorCode::InvalidArity, "missing argument", 0))
}

/// Nodes reachable from `node` along `axis`, in axis order.
fn axis_nodes<'a>(node: &Node<'a>, axis: Axis) -> Vec<Node<'a>> {
    match axis {
        Axis::Child => node.child_nodes().collect(),
        Axis::Descendant => node.descendants().collect(),
        Axis::DescendantOrSelf => iter::once(*node).chain(node.descendants()).collect(),
        Axis::Parent => node.parent().into_iter().collect(),
        Axis::Ancestor => node.ancestors().collect(),
        Axis::AncestorOrSelf => iter::once(*node).chain(node.ancestors()).collect(),
        Axis::FollowingSibling => node.following_siblings().collect(),
        Axis::PrecedingSibling => node.preceding_siblings().collect(),
        Axis::Following => following(node),
        Axis::Preceding => preceding(node),
        Axis::Attribute => node.attribute_nodes(),
        Axis::SelfAxis => vec![*node],
        Axis::Namespace => Vec::new(),
    }
}

/// Element owning an attribute node, or the node itself.
fn anchor<'a>(node: &Node<'a>) -> Node<'a> {
    if node.is_attribute() {
        node.parent().unwrap_or(*node)
    } else {
        *node
    }
}

fn following<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let start = anchor(node);
    let mut out = Vec::new();
    if node.is_attribute() {
        out.extend(start.descendants());
    }
    for level in iter::once(start).chain(start.ancestors()) {
        for sibling in level.following_siblings() {
            out.push(sibling);
            out.extend(sibling.descendants());
        }
    }
    out
}

fn preceding<'a>(node: &Node<'a>) -> Vec<Node<'a>> {
    let start = anchor(node);
    let mut out = Vec::new();
    for level in iter::once(start).chain(start.ancestors()) {
        for sibling in level.preceding_siblings() {
            let mut subtree: Vec<Node<'a>> = sibling.descendants().collect();
            subtree.reverse();
            out.extend(subtree);
            out.push(sibling);
        }
    }
    out
}

fn test_matches(node: &Node<'_>, test: &NodeTest, axis: Axis) -> bool {
    let principal_is_attribute = axis == Axis::Attribute;
    match test {
        NodeTest::Node => true,
        NodeTest::Any if principal_is_attribute => node.is_attribute(),
        NodeTest::Any => node.is_element(),
        NodeTest::Name(name) if principal_is_attribute => {
            node.is_attribute() && node.tag_name().as_deref() == Some(name.as_str())
        }
        NodeTest::Name(name) => node.has_tag(name),
        NodeTest::Text => node.is_text(),
        NodeTest::Comment => node.is_comment(),
        NodeTest::ProcessingInstruction(target) => {
            node.kind() == NodeKind::ProcessingInstruction
                && target
                    .as_ref()
                    .is_none_or(|t| node.processing_instruction_target().as_ref() == Some(t))
        }
    }
}

fn compare(op: BinaryOp, lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
    match (lhs, rhs) {
        (Value::NodeSet(left), Value::NodeSet(right)) => {
            let right: Vec<Value<'_>> = right.iter().map(|n| Value::String(node_string(n))).collect();
            left.iter().any(|l| {
                let l = Value::String(node_string(l));
                right.iter().any(|r| compare_atomic(op, &l, r))
            })
        }
        (Value::NodeSet(nodes), Value::Boolean(_)) => {
            compare_atomic(op, &Value::Boolean(!nodes.is_empty()), rhs)
        }
        (Value::Boolean(_), Value::NodeSet(nodes)) => {
            compare_atomic(op, lhs, &Value::Boolean(!nodes.is_empty()))
        }
        (Value::NodeSet(nodes), other) => nodes
            .iter()
            .any(|n| compare_atomic(op, &Value::String(node_string(n)), other)),
        (other, Value::NodeSet(nodes)) => nodes
            .iter()
            .any(|n| compare_atomic(op, other, &Value::String(node_string(n)))),
        _ => compare_atomic(op, lhs, rhs),
    }
}

fn compare_atomic(op: BinaryOp, lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
    match op {
        BinaryOp::Equal | BinaryOp::NotEqual => {
            let equal = match (lhs, rhs) {
                (Value::Boolean(_), _) | (_, Value::Boolean(_)) => lhs.to_boolean() == rhs.to_boolean(),
                (Value::Number(_), _) | (_, Value::Number(_)) => lhs.to_number() == rhs.to_number(),
                _ => lhs.to_string_value() == rhs.to_string_value(),
            };
            equal == (op == BinaryOp::Equal)
        }
        _ => {
            let (a, b) = (lhs.to_number(), rhs.to_number());
            match op {
                BinaryOp::Less => a < b,
                BinaryOp::LessEqual => a <= b,
                BinaryOp::Greater => a > b,
                _ => a >= b,
            }
        }
    }
}

fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else if (-0.5..0.0).contains(&n) {
        -0.0
    } else {
        (n + 0.5).floor()
    }
}

/// Characters at 1-based positions `p` with `start <= p < end`.
fn substring(text: &str, start: f64, end: f64) -> String {
    text.chars()
        .enumerate()
        .filter(|(index, _)| {
            let position = (index + 1) as f64;
            position >= start && position < end
        })
        .map(|(_, c)| c)
        .collect()
}

fn translate(text: &str, from: &str, to: &str) -> String {
    let from: Vec<char> = from.chars().collect();
    let to: Vec<char> = to.chars().collect();
    text.chars()
        .filter_map(|c| match from.iter().position(|&f| f == c) {
            Some(index) => to.get(index).copied(),
            None => Some(c),
        })
        .collect()
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
