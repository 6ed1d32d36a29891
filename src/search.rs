//! Scoped search.
//!
//! Every named search on [`Node`] reduces to one walk: pick the starting set
//! for a [`Scope`], iterate it in document order, and test each node against a
//! [`Predicate`]. First-match searches stop at the first hit; all-match
//! searches collect every hit and keep descending into matched nodes.
//!
//! ```
//! use markup_nav::{Document, MatchMode, Predicate, Scope};
//!
//! let doc = Document::parse(r#"<div class="a"><p id="x">Hi</p><p>Bye</p></div>"#).unwrap();
//! let div = doc.root().unwrap().descendant_of_tag("div").unwrap();
//!
//! let p = div.search(Scope::Descendant, &Predicate::id("x"), true).unwrap();
//! assert_eq!(p.text_content(), "Hi");
//!
//! let ps = div.search_all(Scope::Child, &Predicate::tag("p"), false);
//! assert_eq!(ps.len(), 2);
//!
//! let hrefs = div.search_all(
//!     Scope::Descendant,
//!     &Predicate::attribute("href", MatchMode::BeginsWith, "https://"),
//!     true,
//! );
//! assert!(hrefs.is_empty());
//! ```

use crate::iter::{Descendants, Linked};
use crate::node::Node;
use crate::predicate::{MatchMode, Predicate};

/// Starting set of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Immediate children of the origin. Always shallow.
    Child,
    /// Siblings after the origin, walking forward only. Always shallow.
    Sibling,
    /// Children of the origin, or the whole subtree when recursive.
    Descendant,
}

/// Nodes visited by a search, in document order.
enum Candidates<'a> {
    Shallow(Linked<'a>),
    Deep(Descendants<'a>),
}

impl<'a> Iterator for Candidates<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Shallow(inner) => inner.next(),
            Self::Deep(inner) => inner.next(),
        }
    }
}

fn candidates<'a>(origin: &Node<'a>, scope: Scope, recursive: bool) -> Candidates<'a> {
    match scope {
        Scope::Child => Candidates::Shallow(origin.child_nodes()),
        Scope::Sibling => Candidates::Shallow(origin.following_siblings()),
        Scope::Descendant if recursive => Candidates::Deep(origin.descendants()),
        Scope::Descendant => Candidates::Shallow(origin.child_nodes()),
    }
}

impl<'a> Node<'a> {
    /// Returns the first node in `scope` matching `predicate`.
    ///
    /// `recursive` only affects [`Scope::Descendant`].
    #[must_use]
    pub fn search(&self, scope: Scope, predicate: &Predicate<'_>, recursive: bool) -> Option<Node<'a>> {
        candidates(self, scope, recursive).find(|node| predicate.matches(node))
    }

    /// Returns every node in `scope` matching `predicate`, in document order.
    #[must_use]
    pub fn search_all(&self, scope: Scope, predicate: &Predicate<'_>, recursive: bool) -> Vec<Node<'a>> {
        candidates(self, scope, recursive)
            .filter(|node| predicate.matches(node))
            .collect()
    }
}

/// Expands to the ten first-match / all-match pairs for one scope.
macro_rules! scoped_searches {
    (
        $scope:expr, $recursive:expr, $label:literal;
        $value_matches:ident, $values_match:ident;
        $value_contains:ident, $values_contain:ident;
        $value_begins:ident, $values_begin:ident;
        $value_ends:ident, $values_end:ident;
        $with_attr:ident, $with_attrs:ident;
        $with_class:ident, $with_classes:ident;
        $with_id:ident, $with_ids:ident;
        $of_tag:ident, $of_tags:ident;
        $tag_matches:ident, $tags_match:ident;
        $tag_contains:ident, $tags_contain:ident;
    ) => {
        impl<'a> Node<'a> {
            #[doc = concat!("First ", $label, " whose attribute `name` equals `value`.")]
            #[must_use]
            pub fn $value_matches(&self, name: &str, value: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::attribute(name, MatchMode::Equals, value), $recursive)
            }

            #[doc = concat!("Every ", $label, " whose attribute `name` equals `value`.")]
            #[must_use]
            pub fn $values_match(&self, name: &str, value: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::attribute(name, MatchMode::Equals, value), $recursive)
            }

            #[doc = concat!("First ", $label, " whose attribute `name` contains `value`.")]
            #[must_use]
            pub fn $value_contains(&self, name: &str, value: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::attribute(name, MatchMode::Contains, value), $recursive)
            }

            #[doc = concat!("Every ", $label, " whose attribute `name` contains `value`.")]
            #[must_use]
            pub fn $values_contain(&self, name: &str, value: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::attribute(name, MatchMode::Contains, value), $recursive)
            }

            #[doc = concat!("First ", $label, " whose attribute `name` begins with `value`.")]
            #[must_use]
            pub fn $value_begins(&self, name: &str, value: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::attribute(name, MatchMode::BeginsWith, value), $recursive)
            }

            #[doc = concat!("Every ", $label, " whose attribute `name` begins with `value`.")]
            #[must_use]
            pub fn $values_begin(&self, name: &str, value: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::attribute(name, MatchMode::BeginsWith, value), $recursive)
            }

            #[doc = concat!("First ", $label, " whose attribute `name` ends with `value`.")]
            #[must_use]
            pub fn $value_ends(&self, name: &str, value: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::attribute(name, MatchMode::EndsWith, value), $recursive)
            }

            #[doc = concat!("Every ", $label, " whose attribute `name` ends with `value`.")]
            #[must_use]
            pub fn $values_end(&self, name: &str, value: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::attribute(name, MatchMode::EndsWith, value), $recursive)
            }

            #[doc = concat!("First ", $label, " carrying attribute `name`.")]
            #[must_use]
            pub fn $with_attr(&self, name: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::has_attribute(name), $recursive)
            }

            #[doc = concat!("Every ", $label, " carrying attribute `name`.")]
            #[must_use]
            pub fn $with_attrs(&self, name: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::has_attribute(name), $recursive)
            }

            #[doc = concat!("First ", $label, " whose whole `class` attribute equals `class`.")]
            #[must_use]
            pub fn $with_class(&self, class: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::class(class), $recursive)
            }

            #[doc = concat!("Every ", $label, " whose whole `class` attribute equals `class`.")]
            #[must_use]
            pub fn $with_classes(&self, class: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::class(class), $recursive)
            }

            #[doc = concat!("First ", $label, " with `id` equal to `id`.")]
            #[must_use]
            pub fn $with_id(&self, id: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::id(id), $recursive)
            }

            #[doc = concat!("Every ", $label, " with `id` equal to `id`.")]
            #[must_use]
            pub fn $with_ids(&self, id: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::id(id), $recursive)
            }

            #[doc = concat!("First ", $label, " with tag name `tag`.")]
            #[must_use]
            pub fn $of_tag(&self, tag: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::tag(tag), $recursive)
            }

            #[doc = concat!("Every ", $label, " with tag name `tag`.")]
            #[must_use]
            pub fn $of_tags(&self, tag: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::tag(tag), $recursive)
            }

            #[doc = concat!("First ", $label, " `tag` whose direct text equals `value`.")]
            #[must_use]
            pub fn $tag_matches(&self, tag: &str, value: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::tag_value(tag, MatchMode::Equals, value), $recursive)
            }

            #[doc = concat!("Every ", $label, " `tag` whose direct text equals `value`.")]
            #[must_use]
            pub fn $tags_match(&self, tag: &str, value: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::tag_value(tag, MatchMode::Equals, value), $recursive)
            }

            #[doc = concat!("First ", $label, " `tag` whose direct text contains `value`.")]
            #[must_use]
            pub fn $tag_contains(&self, tag: &str, value: &str) -> Option<Node<'a>> {
                self.search($scope, &Predicate::tag_value(tag, MatchMode::Contains, value), $recursive)
            }

            #[doc = concat!("Every ", $label, " `tag` whose direct text contains `value`.")]
            #[must_use]
            pub fn $tags_contain(&self, tag: &str, value: &str) -> Vec<Node<'a>> {
                self.search_all($scope, &Predicate::tag_value(tag, MatchMode::Contains, value), $recursive)
            }
        }
    };
}

scoped_searches! {
    Scope::Descendant, true, "descendant";
    descendant_with_attribute_value_matches, descendants_with_attribute_value_matches;
    descendant_with_attribute_value_contains, descendants_with_attribute_value_contains;
    descendant_with_attribute_value_begins_with, descendants_with_attribute_value_begins_with;
    descendant_with_attribute_value_ends_with, descendants_with_attribute_value_ends_with;
    descendant_with_attribute, descendants_with_attribute;
    descendant_with_class, descendants_with_class;
    descendant_with_id, descendants_with_id;
    descendant_of_tag, descendants_of_tag;
    descendant_of_tag_value_matches, descendants_of_tag_value_matches;
    descendant_of_tag_value_contains, descendants_of_tag_value_contains;
}

scoped_searches! {
    Scope::Child, false, "child";
    child_with_attribute_value_matches, children_with_attribute_value_matches;
    child_with_attribute_value_contains, children_with_attribute_value_contains;
    child_with_attribute_value_begins_with, children_with_attribute_value_begins_with;
    child_with_attribute_value_ends_with, children_with_attribute_value_ends_with;
    child_with_attribute, children_with_attribute;
    child_with_class, children_with_class;
    child_with_id, children_with_id;
    child_of_tag, children_of_tag;
    child_of_tag_value_matches, children_of_tag_value_matches;
    child_of_tag_value_contains, children_of_tag_value_contains;
}

scoped_searches! {
    Scope::Sibling, false, "following sibling";
    sibling_with_attribute_value_matches, siblings_with_attribute_value_matches;
    sibling_with_attribute_value_contains, siblings_with_attribute_value_contains;
    sibling_with_attribute_value_begins_with, siblings_with_attribute_value_begins_with;
    sibling_with_attribute_value_ends_with, siblings_with_attribute_value_ends_with;
    sibling_with_attribute, siblings_with_attribute;
    sibling_with_class, siblings_with_class;
    sibling_with_id, siblings_with_id;
    sibling_of_tag, siblings_of_tag;
    sibling_of_tag_value_matches, siblings_of_tag_value_matches;
    sibling_of_tag_value_contains, siblings_of_tag_value_contains;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    const NESTED: &str = r#"<div id="top">
        <section class="s"><p class="s">one</p></section>
        <p class="s">two</p>
        <span data-x="1">three</span>
    </div>"#;

    #[test]
    fn test_shallow_descendant_is_children_only() {
        let doc = Document::parse(NESTED).unwrap();
        let div = doc.root().unwrap().descendant_with_id("top").unwrap();
        let shallow = div.search_all(Scope::Descendant, &Predicate::class("s"), false);
        let deep = div.search_all(Scope::Descendant, &Predicate::class("s"), true);
        assert_eq!(shallow.len(), 2);
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn test_child_and_sibling_ignore_recursive_flag() {
        let doc = Document::parse(NESTED).unwrap();
        let div = doc.root().unwrap().descendant_with_id("top").unwrap();
        let pred = Predicate::class("s");
        assert_eq!(
            div.search_all(Scope::Child, &pred, true),
            div.search_all(Scope::Child, &pred, false)
        );

        let section = div.child_of_tag("section").unwrap();
        assert_eq!(
            section.search_all(Scope::Sibling, &pred, true),
            section.search_all(Scope::Sibling, &pred, false)
        );
    }

    #[test]
    fn test_all_matches_descend_into_matched_nodes() {
        let doc = Document::parse(r#"<div><ul class="m"><li class="m">x</li></ul></div>"#).unwrap();
        let div = doc.root().unwrap().descendant_of_tag("div").unwrap();
        let tags: Vec<_> = div
            .descendants_with_class("m")
            .iter()
            .filter_map(Node::tag_name)
            .collect();
        assert_eq!(tags, vec!["ul", "li"]);
    }

    #[test]
    fn test_sibling_scope_walks_forward_only() {
        let doc = Document::parse(NESTED).unwrap();
        let div = doc.root().unwrap().descendant_with_id("top").unwrap();
        let p = div.child_of_tag("p").unwrap();
        assert!(p.sibling_of_tag("section").is_none());
        assert_eq!(p.sibling_with_attribute("data-x").unwrap().text_content(), "three");
    }

    #[test]
    fn test_tag_value_searches() {
        let doc = Document::parse("<ul><li>apple</li><li>banana</li><li><b>apple</b></li></ul>").unwrap();
        let ul = doc.root().unwrap().descendant_of_tag("ul").unwrap();
        assert_eq!(ul.children_of_tag_value_matches("li", "apple").len(), 1);
        assert_eq!(ul.children_of_tag_value_contains("li", "an").len(), 1);
        assert!(ul.child_of_tag_value_matches("li", "cherry").is_none());
        assert_eq!(ul.descendant_of_tag_value_matches("b", "apple").unwrap().text_content(), "apple");
    }

    #[test]
    fn test_attribute_mode_searches() {
        let doc = Document::parse(
            r#"<nav><a href="https://example.com/a">1</a><a href="http://example.org/b">2</a></nav>"#,
        )
        .unwrap();
        let nav = doc.root().unwrap().descendant_of_tag("nav").unwrap();
        assert_eq!(nav.children_with_attribute_value_begins_with("href", "https://").len(), 1);
        assert!(nav.child_with_attribute_value_ends_with("href", ".com").is_none());
        assert_eq!(nav.children_with_attribute_value_contains("href", "example").len(), 2);
        assert_eq!(
            nav.child_with_attribute_value_matches("href", "http://example.org/b")
                .unwrap()
                .text_content(),
            "2"
        );
    }

    #[test]
    fn test_first_is_head_of_all() {
        let doc = Document::parse(NESTED).unwrap();
        let root = doc.root().unwrap();
        for scope in [Scope::Child, Scope::Sibling, Scope::Descendant] {
            for recursive in [false, true] {
                let pred = Predicate::class("s");
                let all = root.search_all(scope, &pred, recursive);
                assert_eq!(root.search(scope, &pred, recursive), all.first().copied());
            }
        }
    }
}
