//! Selectors and selector matching.
//!
//! A [`Selector`] is a path of [`SelectorPart`]s. The last part must match
//! the element being styled; every earlier part constrains an ancestor or a
//! preceding sibling, according to the [`Combinator`] stored on it.

use sylva_common::warn_once;
use sylva_dom::{DomTree, ElementData, NodeId};

/// Weight of an `#id` in a specificity.
pub const ID_WEIGHT: u32 = 0x01_0000;
/// Weight of a class, attribute test or pseudo-class.
pub const CLASS_WEIGHT: u32 = 0x0100;
/// Weight of a tag name.
pub const TAG_WEIGHT: u32 = 0x01;
/// Specificity of declarations from an element's `style` attribute.
pub const INLINE_SPECIFICITY: u32 = 0x0100_0000;

/// How a part relates to the part on its right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`: some ancestor matches `A`. The closest matching ancestor is
    /// taken, there is no backtracking.
    #[default]
    Descendant,
    /// `A > B`: the parent matches `A`.
    Child,
    /// `A + B`: the previous element sibling matches `A`.
    Sibling,
}

/// An attribute condition written in brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTest {
    /// `[name]`: the attribute has a non-empty value
    Present(String),
    /// `[name=value]`
    Equals(String, String),
    /// `[name~=value]`: one of the whitespace-separated words is `value`
    Includes(String, String),
    /// `[name|=value]`: the value begins with `value`
    BeginsWith(String, String),
}

impl AttributeTest {
    /// Parse the text between `[` and `]`. Quotes around the value are
    /// removed.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let Some((name, value)) = text.split_once('=') else {
            return (!text.is_empty()).then(|| Self::Present(text.to_string()));
        };
        let value = unquote(value.trim()).to_string();
        let test = if let Some(name) = name.strip_suffix('~') {
            Self::Includes(name.trim().to_string(), value)
        } else if let Some(name) = name.strip_suffix('|') {
            Self::BeginsWith(name.trim().to_string(), value)
        } else {
            Self::Equals(name.trim().to_string(), value)
        };
        Some(test)
    }

    fn matches(&self, element: &ElementData) -> bool {
        match self {
            Self::Present(name) => element.attrs.get(name).is_some_and(|v| !v.is_empty()),
            Self::Equals(name, value) => element.attrs.get(name) == Some(value.as_str()),
            Self::Includes(name, value) => element
                .attrs
                .get(name)
                .is_some_and(|v| v.split_ascii_whitespace().any(|word| word == value)),
            Self::BeginsWith(name, value) => element
                .attrs
                .get(name)
                .is_some_and(|v| v.starts_with(value.as_str())),
        }
    }
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|&q| value.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(value)
}

/// Pseudo-classes. Only the structural ones can be decided on a static tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:first-child`: no element sibling before it
    FirstChild,
    /// `:last-child`: no element sibling after it
    LastChild,
    /// `:root`: the document element
    Root,
    /// `:empty`: no children at all
    Empty,
    /// Anything else (`:hover`, `::before`, ...). Never matches.
    Unsupported(String),
}

impl PseudoClass {
    /// Pseudo-class named `name` (without the colon). Unsupported names are
    /// reported once.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "root" => Self::Root,
            "empty" => Self::Empty,
            _ => {
                let _ = warn_once("CSS", &format!("unsupported pseudo-class ':{name}'"));
                Self::Unsupported(name.to_string())
            }
        }
    }

    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let is_element = |id: &NodeId| tree.as_element(*id).is_some();
        match self {
            Self::FirstChild => tree.preceding_siblings(node).find(is_element).is_none(),
            Self::LastChild => {
                let mut next = tree.next_sibling(node);
                while let Some(id) = next {
                    if is_element(&id) {
                        return false;
                    }
                    next = tree.next_sibling(id);
                }
                true
            }
            Self::Root => tree.document_element() == Some(node),
            Self::Empty => tree.children(node).is_empty(),
            Self::Unsupported(_) => false,
        }
    }
}

/// One compound step of a selector: `tag#id.class[attr]:pseudo`.
///
/// All conditions that are present must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorPart {
    /// Tag name, `*` or `None` for any element
    pub tag: Option<String>,
    /// Required `id`
    pub id: Option<String>,
    /// Required classes, all of them
    pub classes: Vec<String>,
    /// Attribute conditions, all of them
    pub attributes: Vec<AttributeTest>,
    /// Pseudo-class condition
    pub pseudo: Option<PseudoClass>,
    /// Relation to the part on the right
    pub combinator: Combinator,
}

impl SelectorPart {
    /// No condition written at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo.is_none()
    }

    /// Specificity contributed by this part.
    #[must_use]
    pub fn specificity(&self) -> u32 {
        let mut specificity = 0;
        if self.id.is_some() {
            specificity += ID_WEIGHT;
        }
        if self.pseudo.is_some() {
            specificity += CLASS_WEIGHT;
        }
        let tests = u32::try_from(self.classes.len() + self.attributes.len()).unwrap_or(u32::MAX);
        specificity = specificity.saturating_add(CLASS_WEIGHT.saturating_mul(tests));
        if self.tag.as_deref().is_some_and(|tag| tag != "*") {
            specificity += TAG_WEIGHT;
        }
        specificity
    }

    /// Whether the node is an element satisfying every condition.
    ///
    /// Tag, id and class comparisons follow the element's case sensitivity.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        let same = |a: &str, b: &str| {
            if element.kind.case_sensitive {
                a == b
            } else {
                a.eq_ignore_ascii_case(b)
            }
        };

        if self
            .tag
            .as_deref()
            .is_some_and(|tag| tag != "*" && !element.tag_is(tag))
        {
            return false;
        }
        if self
            .id
            .as_deref()
            .is_some_and(|id| !element.id().is_some_and(|actual| same(actual, id)))
        {
            return false;
        }
        if !self
            .classes
            .iter()
            .all(|class| element.classes().any(|actual| same(actual, class)))
        {
            return false;
        }
        if !self.attributes.iter().all(|test| test.matches(element)) {
            return false;
        }
        self.pseudo
            .as_ref()
            .is_none_or(|pseudo| pseudo.matches(tree, node))
    }
}

/// A complete selector: parts from the outermost to the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<SelectorPart>,
    specificity: u32,
}

impl Selector {
    /// Selector over `parts`, the last one being the subject.
    #[must_use]
    pub fn new(parts: Vec<SelectorPart>) -> Self {
        let specificity = parts
            .iter()
            .fold(0u32, |sum, part| sum.saturating_add(part.specificity()));
        Self { parts, specificity }
    }

    /// The parts, outermost first.
    #[must_use]
    pub fn parts(&self) -> &[SelectorPart] {
        &self.parts
    }

    /// Summed specificity of all parts.
    #[must_use]
    pub const fn specificity(&self) -> u32 {
        self.specificity
    }

    /// More than one part: ancestors or siblings have to be checked too.
    #[must_use]
    pub fn has_predecessor(&self) -> bool {
        self.parts.len() > 1
    }

    /// Match against `node` and walk outward through the earlier parts.
    ///
    /// A sibling part must match the previous element sibling exactly; a
    /// child part only the parent; a descendant part the closest ancestor
    /// that matches it.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some((subject, rest)) = self.parts.split_last() else {
            return false;
        };
        if !subject.matches(tree, node) {
            return false;
        }

        let mut current = node;
        for part in rest.iter().rev() {
            let found = match part.combinator {
                Combinator::Sibling => tree
                    .previous_element_sibling(current)
                    .filter(|&sibling| part.matches(tree, sibling)),
                Combinator::Child => tree
                    .parent(current)
                    .filter(|&parent| part.matches(tree, parent)),
                Combinator::Descendant => tree
                    .ancestors(current)
                    .find(|&ancestor| part.matches(tree, ancestor)),
            };
            match found {
                Some(next) => current = next,
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sylva_dom::{ElementKind, NodeType};

    fn make_element(tag: &str, attrs: &[(&str, &str)]) -> NodeType {
        let mut data = ElementData::new(tag, ElementKind::ANY);
        for &(name, value) in attrs {
            data.attrs.set(name, value);
        }
        NodeType::Element(data)
    }

    fn part(tag: &str) -> SelectorPart {
        SelectorPart {
            tag: Some(tag.to_string()),
            ..SelectorPart::default()
        }
    }

    /// `<ul><li class="a b"/><li id="x" lang="en-US"/></ul>`
    fn list() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let ul = tree.alloc(make_element("ul", &[]));
        tree.append_child(NodeId::ROOT, ul);
        let first = tree.alloc(make_element("li", &[("class", "a b")]));
        tree.append_child(ul, first);
        let second = tree.alloc(make_element("li", &[("id", "x"), ("lang", "en-US")]));
        tree.append_child(ul, second);
        (tree, ul, first, second)
    }

    #[test]
    fn test_specificity_weights() {
        let compound = SelectorPart {
            tag: Some("p".to_string()),
            id: Some("x".to_string()),
            classes: vec!["a".to_string(), "b".to_string()],
            attributes: vec![AttributeTest::Present("title".to_string())],
            pseudo: Some(PseudoClass::FirstChild),
            combinator: Combinator::Descendant,
        };
        assert_eq!(compound.specificity(), 0x01_0401);
        assert_eq!(part("*").specificity(), 0);
        assert_eq!(
            Selector::new(vec![part("ul"), part("li")]).specificity(),
            2 * TAG_WEIGHT
        );
    }

    #[test]
    fn test_classes_are_conjunctive() {
        let (tree, _, first, _) = list();
        let both = SelectorPart {
            classes: vec!["a".to_string(), "b".to_string()],
            ..SelectorPart::default()
        };
        assert!(both.matches(&tree, first));

        let missing = SelectorPart {
            classes: vec!["a".to_string(), "c".to_string()],
            ..SelectorPart::default()
        };
        assert!(!missing.matches(&tree, first));
    }

    #[test]
    fn test_attribute_tests() {
        let (tree, _, first, second) = list();
        let check = |text: &str, node| {
            let test = AttributeTest::parse(text).expect("attribute test");
            SelectorPart {
                attributes: vec![test],
                ..SelectorPart::default()
            }
            .matches(&tree, node)
        };
        assert!(check("class~=b", first));
        assert!(!check("class~=c", first));
        assert!(check("lang|=\"en\"", second));
        assert!(check("id='x'", second));
        assert!(check("lang", second));
        assert!(!check("lang", first));
    }

    #[test]
    fn test_structural_pseudo_classes() {
        let (tree, ul, first, second) = list();
        let with = |pseudo| SelectorPart {
            pseudo: Some(pseudo),
            ..SelectorPart::default()
        };
        assert!(with(PseudoClass::FirstChild).matches(&tree, first));
        assert!(!with(PseudoClass::FirstChild).matches(&tree, second));
        assert!(with(PseudoClass::LastChild).matches(&tree, second));
        assert!(with(PseudoClass::Root).matches(&tree, ul));
        assert!(with(PseudoClass::Empty).matches(&tree, first));
        assert!(!with(PseudoClass::Unsupported("hover".to_string())).matches(&tree, first));
    }

    #[test]
    fn test_combinators() {
        let (tree, _, first, second) = list();
        let child = Selector::new(vec![
            SelectorPart {
                combinator: Combinator::Child,
                ..part("ul")
            },
            part("li"),
        ]);
        assert!(child.matches(&tree, second));

        let sibling = Selector::new(vec![
            SelectorPart {
                combinator: Combinator::Sibling,
                ..part("li")
            },
            part("li"),
        ]);
        assert!(sibling.matches(&tree, second));
        assert!(!sibling.matches(&tree, first));

        let descendant = Selector::new(vec![part("ol"), part("li")]);
        assert!(!descendant.matches(&tree, first));
    }
}
