//! Lazy traversal over tree links.
//!
//! Every walk in this crate is built from two iterators:
//!
//! - [`Linked`] follows one link kind (next sibling, previous sibling,
//!   parent) until it runs out. The link is a plain function pointer, so
//!   sibling walks, reverse sibling walks and ancestor walks share one type.
//! - [`Descendants`] walks a subtree in pre-order without recursion and
//!   without leaving the subtree it started in.
//!
//! Both borrow the tree and never mutate it. Dropping them early needs no
//! cleanup.

use std::iter::FusedIterator;

use dom_query::NodeRef;

use crate::node::Node;

/// Advances from one node to the next along a single link kind.
pub type Advance<'a> = fn(&NodeRef<'a>) -> Option<NodeRef<'a>>;

/// Iterator following one link kind from a starting node.
#[derive(Clone)]
pub struct Linked<'a> {
    next: Option<NodeRef<'a>>,
    advance: Advance<'a>,
}

impl<'a> Linked<'a> {
    /// Starts at `start` (inclusive) and follows `advance`.
    #[must_use]
    pub fn new(start: Option<NodeRef<'a>>, advance: Advance<'a>) -> Self {
        Self {
            next: start,
            advance,
        }
    }

    /// Forward siblings beginning at `start`.
    #[must_use]
    pub fn forward(start: Option<NodeRef<'a>>) -> Self {
        Self::new(start, |n| n.next_sibling())
    }

    /// Backward siblings beginning at `start`.
    #[must_use]
    pub fn backward(start: Option<NodeRef<'a>>) -> Self {
        Self::new(start, |n| n.prev_sibling())
    }

    /// Ancestors beginning at `start`, nearest first.
    #[must_use]
    pub fn upward(start: Option<NodeRef<'a>>) -> Self {
        Self::new(start, |n| n.parent())
    }

    /// An iterator that yields nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(None, |_| None)
    }
}

impl<'a> Iterator for Linked<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = (self.advance)(&current);
        Some(Node::new(current))
    }
}

impl FusedIterator for Linked<'_> {}

/// Pre-order iterator over the strict descendants of a node.
#[derive(Clone)]
pub struct Descendants<'a> {
    origin: Option<NodeRef<'a>>,
    next: Option<NodeRef<'a>>,
}

impl<'a> Descendants<'a> {
    /// Descendants of `origin` in document order, `origin` excluded.
    #[must_use]
    pub fn new(origin: NodeRef<'a>) -> Self {
        Self {
            next: origin.first_child(),
            origin: Some(origin),
        }
    }

    /// An iterator that yields nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            origin: None,
            next: None,
        }
    }

    /// Successor of `current` in pre-order, bounded by the origin.
    fn successor(&self, current: &NodeRef<'a>) -> Option<NodeRef<'a>> {
        if let Some(child) = current.first_child() {
            return Some(child);
        }
        let origin = self.origin?;
        let mut node = *current;
        loop {
            if node.id == origin.id {
                return None;
            }
            if let Some(sibling) = node.next_sibling() {
                return Some(sibling);
            }
            node = node.parent()?;
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.successor(&current);
        Some(Node::new(current))
    }
}

impl FusedIterator for Descendants<'_> {}

/// Element children of a node in document order, skipping text and comments.
///
/// Created by [`Node::element_children`]. Each call to that method starts a
/// fresh walk from the first child.
#[derive(Clone)]
pub struct ElementChildren<'a> {
    inner: Linked<'a>,
}

impl<'a> ElementChildren<'a> {
    pub(crate) fn new(inner: Linked<'a>) -> Self {
        Self { inner }
    }
}

impl<'a> Iterator for ElementChildren<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find(Node::is_element)
    }
}

impl FusedIterator for ElementChildren<'_> {}

#[cfg(test)]
mod tests {
    use crate::Document;

    fn tags<'a>(nodes: impl Iterator<Item = crate::Node<'a>>) -> Vec<String> {
        nodes.filter_map(|n| n.tag_name()).collect()
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = Document::parse("<div><a><b></b></a><c><d></d></c></div><e></e>").unwrap();
        let div = doc.root().unwrap().descendant_of_tag("div").unwrap();
        assert_eq!(tags(div.descendants()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_descendants_stay_inside_origin() {
        let doc = Document::parse("<div><p>x</p></div><span>y</span>").unwrap();
        let p = doc.root().unwrap().descendant_of_tag("p").unwrap();
        let inner: Vec<_> = p.descendants().collect();
        assert_eq!(inner.len(), 1);
        assert!(inner[0].is_text());
    }

    #[test]
    fn test_descendants_of_leaf_is_empty() {
        let doc = Document::parse("<div><br></div>").unwrap();
        let br = doc.root().unwrap().descendant_of_tag("br").unwrap();
        assert_eq!(br.descendants().count(), 0);
    }

    #[test]
    fn test_element_children_skip_text() {
        let doc = Document::parse("<ul>\n  <li>1</li>\n  text\n  <li>2</li>\n</ul>").unwrap();
        let ul = doc.root().unwrap().descendant_of_tag("ul").unwrap();
        assert!(ul.children().len() > 2);
        assert_eq!(tags(ul.element_children()), vec!["li", "li"]);
    }

    #[test]
    fn test_element_children_restart_each_call() {
        let doc = Document::parse("<ul><li>1</li><li>2</li></ul>").unwrap();
        let ul = doc.root().unwrap().descendant_of_tag("ul").unwrap();
        let first = ul.element_children().next();
        let again = ul.element_children().next();
        assert_eq!(first, again);
        assert_eq!(ul.element_children().count(), 2);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let doc = Document::parse("<div><section><p>x</p></section></div>").unwrap();
        let p = doc.root().unwrap().descendant_of_tag("p").unwrap();
        let chain = tags(p.ancestors());
        assert_eq!(&chain[..3], &["section", "div", "body"]);
        assert_eq!(chain.last().map(String::as_str), Some("html"));
    }

    #[test]
    fn test_preceding_siblings_walk_backward() {
        let doc = Document::parse("<ol><li>1</li><li>2</li><li>3</li></ol>").unwrap();
        let ol = doc.root().unwrap().descendant_of_tag("ol").unwrap();
        let last = ol.last_child().unwrap();
        let texts: Vec<_> = last.preceding_siblings().map(|n| n.text_content()).collect();
        assert_eq!(texts, vec!["2", "1"]);
    }
}
