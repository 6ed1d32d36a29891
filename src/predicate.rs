//! Match predicates.
//!
//! A [`Predicate`] pairs a target (an attribute name, a tag name, or a tag
//! name plus its direct text value) with a [`MatchMode`]. Comparisons are
//! case-sensitive over raw content.

use crate::node::Node;

/// String comparison strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Whole-string equality.
    Equals,
    /// Value occurs anywhere.
    Contains,
    /// Value is a prefix.
    BeginsWith,
    /// Value is a suffix.
    EndsWith,
    /// Presence only; the value is ignored.
    Exists,
}

impl MatchMode {
    /// Tests `candidate` against `value` under this mode.
    #[inline]
    #[must_use]
    pub fn test(self, candidate: &str, value: &str) -> bool {
        match self {
            Self::Equals => candidate == value,
            Self::Contains => candidate.contains(value),
            Self::BeginsWith => candidate.starts_with(value),
            Self::EndsWith => candidate.ends_with(value),
            Self::Exists => true,
        }
    }
}

/// What a predicate inspects on each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'p> {
    /// An attribute with this name.
    Attribute(&'p str),
    /// The tag name only.
    Tag(&'p str),
    /// The tag name and the node's direct text value.
    TagValue(&'p str),
}

/// A tag or attribute condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate<'p> {
    pub target: Target<'p>,
    pub mode: MatchMode,
    pub value: &'p str,
}

impl<'p> Predicate<'p> {
    /// Attribute `name` whose value satisfies `mode`.
    #[must_use]
    pub fn attribute(name: &'p str, mode: MatchMode, value: &'p str) -> Self {
        Self {
            target: Target::Attribute(name),
            mode,
            value,
        }
    }

    /// Attribute `name` is present.
    #[must_use]
    pub fn has_attribute(name: &'p str) -> Self {
        Self::attribute(name, MatchMode::Exists, "")
    }

    /// `class` equals `value` as a whole string.
    #[must_use]
    pub fn class(value: &'p str) -> Self {
        Self::attribute("class", MatchMode::Equals, value)
    }

    /// `id` equals `value`.
    #[must_use]
    pub fn id(value: &'p str) -> Self {
        Self::attribute("id", MatchMode::Equals, value)
    }

    /// Element with tag name `tag`.
    #[must_use]
    pub fn tag(tag: &'p str) -> Self {
        Self {
            target: Target::Tag(tag),
            mode: MatchMode::Exists,
            value: "",
        }
    }

    /// Element with tag name `tag` whose direct text value satisfies `mode`.
    #[must_use]
    pub fn tag_value(tag: &'p str, mode: MatchMode, value: &'p str) -> Self {
        Self {
            target: Target::TagValue(tag),
            mode,
            value,
        }
    }

    /// True if `node` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, node: &Node<'_>) -> bool {
        match self.target {
            Target::Attribute(name) => {
                if node.is_attribute() {
                    return false;
                }
                node.node_ref()
                    .attrs()
                    .iter()
                    .any(|a| &*a.name.local == name && self.mode.test(&a.value, self.value))
            }
            Target::Tag(tag) => node.has_tag(tag),
            Target::TagValue(tag) => {
                node.has_tag(tag)
                    && node
                        .raw_string_value()
                        .is_some_and(|text| self.mode.test(&text, self.value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;

    #[test]
    fn test_modes() {
        let href = "https://example.com/a";
        assert!(MatchMode::BeginsWith.test(href, "https://"));
        assert!(!MatchMode::EndsWith.test(href, ".com"));
        assert!(MatchMode::EndsWith.test(href, "/a"));
        assert!(MatchMode::Contains.test(href, "example"));
        assert!(!MatchMode::Equals.test(href, "https://example.com"));
        assert!(MatchMode::Exists.test(href, "anything"));
    }

    #[test]
    fn test_modes_are_case_sensitive() {
        assert!(!MatchMode::Equals.test("Main", "main"));
        assert!(!MatchMode::Contains.test("NAV bar", "nav"));
    }

    #[test]
    fn test_class_is_not_token_aware() {
        let doc = Document::parse(r#"<p class="a b">x</p>"#).unwrap();
        let p = doc.root().unwrap().descendant_of_tag("p").unwrap();
        assert!(!Predicate::class("b").matches(&p));
        assert!(Predicate::class("a b").matches(&p));
    }

    #[test]
    fn test_tag_value_needs_direct_text() {
        let doc = Document::parse("<p>Hi</p><p><b>Hi</b></p><p></p>").unwrap();
        let ps: Vec<_> = doc.root().unwrap().descendants_of_tag("p");
        let pred = Predicate::tag_value("p", MatchMode::Equals, "Hi");
        assert!(pred.matches(&ps[0]));
        assert!(!pred.matches(&ps[1]));
        assert!(!pred.matches(&ps[2]));
    }

    #[test]
    fn test_text_nodes_never_match_tag() {
        let doc = Document::parse("<p>p</p>").unwrap();
        let text = doc.root().unwrap().descendant_of_tag("p").unwrap().first_child().unwrap();
        assert!(!Predicate::tag("p").matches(&text));
        assert!(!Predicate::tag_value("p", MatchMode::Exists, "").matches(&text));
    }

    #[test]
    fn test_presence_only() {
        let doc = Document::parse(r#"<a href="">x</a><a>y</a>"#).unwrap();
        let links = doc.root().unwrap().descendants_of_tag("a");
        let pred = Predicate::has_attribute("href");
        assert!(pred.matches(&links[0]));
        assert!(!pred.matches(&links[1]));
    }
}
