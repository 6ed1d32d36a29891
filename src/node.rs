//! Node handles.
//!
//! A [`Node`] is a borrowed view of one node of a parsed tree. It is `Copy`,
//! costs two words plus an index, and is created on demand whenever a caller
//! navigates or searches. The borrow ties each handle to the [`Document`]
//! that owns the tree, so a handle can never outlive its tree.
//!
//! Attribute nodes (selected by queries such as `//a/@href`) are represented
//! by the owning element plus the attribute's position in its attribute list.
//!
//! [`Document`]: crate::Document

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use dom_query::{NodeData, NodeId, NodeRef};
use tendril::StrTendril;
use url::Url;

use crate::iter::{Descendants, ElementChildren, Linked};
use crate::patterns::collapse_whitespace;

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The document node above the root element.
    Document,
    /// The root of a parsed fragment.
    Fragment,
    /// A `<!DOCTYPE>` declaration.
    Doctype,
    /// An element such as `<p>`.
    Element,
    /// Character data.
    Text,
    /// A `<!-- comment -->`.
    Comment,
    /// A processing instruction.
    ProcessingInstruction,
    /// An attribute of an element.
    Attribute,
}

/// Borrowed handle to one node of a parsed tree.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    node: NodeRef<'a>,
    attr: Option<usize>,
}

impl<'a> Node<'a> {
    /// Wraps a tree node.
    #[must_use]
    pub fn new(node: NodeRef<'a>) -> Self {
        Self { node, attr: None }
    }

    /// Wraps the attribute at `index` of `owner`.
    pub(crate) fn attribute_of(owner: NodeRef<'a>, index: usize) -> Self {
        Self {
            node: owner,
            attr: Some(index),
        }
    }

    /// The underlying tree node. For attribute nodes this is the owner element.
    #[must_use]
    pub fn node_ref(&self) -> NodeRef<'a> {
        self.node
    }

    /// Arena identifier of the underlying tree node.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.node.id
    }

    /// Position in the owner's attribute list, for attribute nodes.
    #[must_use]
    pub fn attribute_index(&self) -> Option<usize> {
        self.attr
    }

    // === Kind ===

    /// Returns the node kind.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        if self.attr.is_some() {
            return NodeKind::Attribute;
        }
        self.node
            .query(|tree_node| match &tree_node.data {
                NodeData::Document => NodeKind::Document,
                NodeData::Fragment => NodeKind::Fragment,
                NodeData::Doctype { .. } => NodeKind::Doctype,
                NodeData::Text { .. } => NodeKind::Text,
                NodeData::Comment { .. } => NodeKind::Comment,
                NodeData::Element(_) => NodeKind::Element,
                NodeData::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
            })
            .unwrap_or(NodeKind::Document)
    }

    #[must_use]
    pub fn is_element(&self) -> bool {
        self.kind() == NodeKind::Element
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind() == NodeKind::Text
    }

    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind() == NodeKind::Comment
    }

    #[must_use]
    pub fn is_attribute(&self) -> bool {
        self.attr.is_some()
    }

    /// True for document and fragment roots.
    #[must_use]
    pub fn is_document(&self) -> bool {
        matches!(self.kind(), NodeKind::Document | NodeKind::Fragment)
    }

    /// Tag name for elements, attribute name for attribute nodes.
    ///
    /// Text, comment and document nodes have no tag name.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        match self.attr {
            Some(index) => self
                .node
                .attrs()
                .get(index)
                .map(|a| a.name.local.to_string()),
            None if self.is_element() => self.node.node_name().map(|t| t.to_string()),
            None => None,
        }
    }

    /// Target of a processing instruction.
    #[must_use]
    pub fn processing_instruction_target(&self) -> Option<String> {
        if self.attr.is_some() {
            return None;
        }
        self.node
            .query(|tree_node| match &tree_node.data {
                NodeData::ProcessingInstruction { target, .. } => Some(target.to_string()),
                _ => None,
            })
            .flatten()
    }

    /// True if this is an element with the given tag name.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.attr.is_none()
            && self.is_element()
            && self.node.node_name().is_some_and(|t| &*t == tag)
    }

    // === Navigation ===

    /// Returns the parent node. The parent of an attribute is its element.
    #[must_use]
    pub fn parent(&self) -> Option<Node<'a>> {
        if self.attr.is_some() {
            return Some(Node::new(self.node));
        }
        self.node.parent().map(Node::new)
    }

    /// Returns the next sibling, including text nodes.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Node<'a>> {
        if self.attr.is_some() {
            return None;
        }
        self.node.next_sibling().map(Node::new)
    }

    /// Returns the previous sibling, including text nodes.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<Node<'a>> {
        if self.attr.is_some() {
            return None;
        }
        self.node.prev_sibling().map(Node::new)
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Node<'a>> {
        if self.attr.is_some() {
            return None;
        }
        self.node.first_child().map(Node::new)
    }

    #[must_use]
    pub fn last_child(&self) -> Option<Node<'a>> {
        if self.attr.is_some() {
            return None;
        }
        self.node.last_child().map(Node::new)
    }

    /// Returns all child nodes (elements, text, comments) in document order.
    #[must_use]
    pub fn children(&self) -> Vec<Node<'a>> {
        self.child_nodes().collect()
    }

    /// Returns the number of child nodes.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.child_nodes().count()
    }

    /// Returns the child at `index`, counting every child node.
    #[must_use]
    pub fn child_at(&self, index: usize) -> Option<Node<'a>> {
        self.child_nodes().nth(index)
    }

    /// Lazily walks the child nodes.
    #[must_use]
    pub fn child_nodes(&self) -> Linked<'a> {
        if self.attr.is_some() {
            return Linked::empty();
        }
        Linked::forward(self.node.first_child())
    }

    /// Lazily walks the element children, skipping text and comment nodes.
    ///
    /// Every call starts a fresh walk from the first child.
    #[must_use]
    pub fn element_children(&self) -> ElementChildren<'a> {
        ElementChildren::new(self.child_nodes())
    }

    /// Lazily walks the subtree below this node in pre-order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'a> {
        if self.attr.is_some() {
            return Descendants::empty();
        }
        Descendants::new(self.node)
    }

    /// Siblings after this node, nearest first.
    #[must_use]
    pub fn following_siblings(&self) -> Linked<'a> {
        if self.attr.is_some() {
            return Linked::empty();
        }
        Linked::forward(self.node.next_sibling())
    }

    /// Siblings before this node, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self) -> Linked<'a> {
        if self.attr.is_some() {
            return Linked::empty();
        }
        Linked::backward(self.node.prev_sibling())
    }

    /// The document (or fragment) node at the top of this node's tree.
    #[must_use]
    pub fn owner_document(&self) -> Node<'a> {
        Linked::upward(Some(self.node))
            .last()
            .unwrap_or_else(|| Node::new(self.node))
    }

    /// Ancestors of this node, nearest first, ending with the document node.
    #[must_use]
    pub fn ancestors(&self) -> Linked<'a> {
        match self.attr {
            Some(_) => Linked::upward(Some(self.node)),
            None => Linked::upward(self.node.parent()),
        }
    }

    // === Attributes ===

    /// Returns the value of the named attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        if self.attr.is_some() {
            return None;
        }
        self.node.attr(name).map(|v| v.to_string())
    }

    /// True if the node carries the named attribute.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attr.is_none() && self.node.has_attr(name)
    }

    /// Returns all attributes as a name → value map.
    #[must_use]
    pub fn attributes(&self) -> BTreeMap<String, String> {
        if self.attr.is_some() {
            return BTreeMap::new();
        }
        self.node
            .attrs()
            .iter()
            .map(|a| (a.name.local.to_string(), a.value.to_string()))
            .collect()
    }

    /// Attribute nodes of this element, in source order.
    #[must_use]
    pub fn attribute_nodes(&self) -> Vec<Node<'a>> {
        if self.attr.is_some() {
            return Vec::new();
        }
        (0..self.node.attrs().len())
            .map(|index| Node::attribute_of(self.node, index))
            .collect()
    }

    /// Value of the `class` attribute.
    #[must_use]
    pub fn class_name(&self) -> Option<String> {
        self.attribute("class")
    }

    /// Value of the `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Value of the `href` attribute.
    #[must_use]
    pub fn href(&self) -> Option<String> {
        self.attribute("href")
    }

    /// Value of the `src` attribute.
    #[must_use]
    pub fn src(&self) -> Option<String> {
        self.attribute("src")
    }

    /// `href` resolved against `base`.
    ///
    /// Returns `None` when there is no `href`, the base is not an absolute
    /// URL, or the join fails.
    #[must_use]
    pub fn resolved_href(&self, base: &str) -> Option<Url> {
        let href = self.href()?;
        let base = Url::parse(base).ok()?;
        base.join(href.trim()).ok()
    }

    // === Values ===

    /// Direct text value without trimming.
    ///
    /// Present for text nodes, attribute nodes, and elements whose only
    /// child is a text node.
    #[must_use]
    pub fn raw_string_value(&self) -> Option<String> {
        if let Some(index) = self.attr {
            return self.node.attrs().get(index).map(|a| a.value.to_string());
        }
        match self.kind() {
            NodeKind::Text => Some(self.node.text().to_string()),
            NodeKind::Element => {
                let child = self.node.first_child()?;
                let only_child = child.next_sibling().is_none();
                let child = Node::new(child);
                (only_child && child.is_text()).then(|| child.node.text().to_string())
            }
            _ => None,
        }
    }

    /// Direct text value trimmed of surrounding whitespace.
    #[must_use]
    pub fn string_value(&self) -> Option<String> {
        self.raw_string_value().map(|v| v.trim().to_string())
    }

    /// Direct text value with whitespace runs collapsed to single spaces.
    #[must_use]
    pub fn string_value_collapsing_whitespace(&self) -> Option<String> {
        self.raw_string_value().map(|v| collapse_whitespace(&v))
    }

    /// Concatenated text of this node and all its descendants, untrimmed.
    ///
    /// Comments yield their contents; attribute nodes their value.
    #[must_use]
    pub fn raw_text_content(&self) -> StrTendril {
        if let Some(index) = self.attr {
            return self
                .node
                .attrs()
                .get(index)
                .map(|a| a.value.clone())
                .unwrap_or_default();
        }
        let comment = self.node.query(|tree_node| match &tree_node.data {
            NodeData::Comment { contents } => Some(contents.clone()),
            _ => None,
        });
        match comment.flatten() {
            Some(contents) => contents,
            None => self.node.text(),
        }
    }

    /// Text content of the subtree, trimmed.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.raw_text_content().trim().to_string()
    }

    /// Text content of the subtree with whitespace runs collapsed.
    #[must_use]
    pub fn text_content_collapsing_whitespace(&self) -> String {
        collapse_whitespace(&self.raw_text_content())
    }

    /// Trimmed text content of each child, skipping children without text.
    #[must_use]
    pub fn text_content_of_children(&self) -> Vec<String> {
        self.child_nodes()
            .map(|child| child.text_content())
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Trimmed content of each descendant text node, skipping blank ones.
    #[must_use]
    pub fn text_content_of_descendants(&self) -> Vec<String> {
        if self.is_text() {
            let own = self.text_content();
            return if own.is_empty() { Vec::new() } else { vec![own] };
        }
        self.descendants()
            .filter(Node::is_text)
            .map(|text| text.text_content())
            .filter(|text| !text.is_empty())
            .collect()
    }

    /// Serialized markup of this node including its own tag.
    ///
    /// For attribute nodes this is `name="value"`.
    #[must_use]
    pub fn html_string(&self) -> String {
        if let Some(index) = self.attr {
            return self
                .node
                .attrs()
                .get(index)
                .map(|a| format!("{}=\"{}\"", a.name.local, a.value))
                .unwrap_or_default();
        }
        self.node.html().to_string()
    }

    /// Serialized markup of the children only.
    #[must_use]
    pub fn html_content(&self) -> String {
        if self.attr.is_some() {
            return String::new();
        }
        self.node.inner_html().to_string()
    }

    // === Document order ===

    /// Compares two handles by document order.
    ///
    /// Returns `None` when the handles belong to different trees. An element
    /// precedes its attributes, which precede its children.
    #[must_use]
    pub fn compare_document_order(&self, other: &Node<'_>) -> Option<Ordering> {
        if !std::ptr::eq(self.node.tree, other.node.tree) {
            return None;
        }
        if self.node.id == other.node.id {
            return Some(match (self.attr, other.attr) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(&b),
            });
        }

        let left = self.path_from_root();
        let right = other.path_from_root();
        let shared = left
            .iter()
            .zip(&right)
            .take_while(|(a, b)| a.id == b.id)
            .count();

        let ordering = match (left.get(shared), right.get(shared)) {
            // Ancestors and their attributes precede descendants.
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => {
                if Linked::forward(a.next_sibling()).any(|n| n.node.id == b.id) {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (None, None) => Ordering::Equal,
        };
        Some(ordering)
    }

    /// Chain of tree nodes from the document node down to this node.
    fn path_from_root(&self) -> Vec<NodeRef<'a>> {
        let mut path: Vec<NodeRef<'a>> = Linked::upward(Some(self.node))
            .map(|n| n.node)
            .collect();
        path.reverse();
        path
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.node.tree, other.node.tree)
            && self.node.id == other.node.id
            && self.attr == other.attr
    }
}

impl Eq for Node<'_> {}

impl PartialOrd for Node<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare_document_order(other)
    }
}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.node.tree, state);
        self.node.id.hash(state);
        self.attr.hash(state);
    }
}

impl<'a> From<NodeRef<'a>> for Node<'a> {
    fn from(node: NodeRef<'a>) -> Self {
        Node::new(node)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.node.id)
            .field("kind", &self.kind())
            .field("tag", &self.tag_name())
            .field("attr", &self.attr)
            .finish()
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html_string())
    }
}
