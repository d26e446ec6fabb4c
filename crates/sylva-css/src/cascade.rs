//! Cascade resolution.
//!
//! [`StyleResolver`] picks the effective value of a property for an element
//! from the matching rules, the element's `style` attribute and its parent,
//! and memoizes the result in a side table keyed by `(NodeId, Property)`.
//! The tree itself is never modified.

use std::collections::{BTreeMap, HashMap};

use strum::IntoEnumIterator;
use sylva_dom::{DomTree, NodeId};

use crate::color::{Color, parse_color};
use crate::declarations::Declarations;
use crate::keywords::{
    BorderStyle, Decorations, Display, Float, FontStyle, ListStyle, Position, TextAlign, WhiteSpace,
};
use crate::rules::Rules;
use crate::selector::INLINE_SPECIFICITY;
use crate::values::{Property, Side, Value};

/// Media used until [`StyleResolver::set_media`] says otherwise.
pub const DEFAULT_MEDIA: &str = "screen";

/// Resolves cascaded values for the elements of one tree.
#[derive(Debug)]
pub struct StyleResolver<'a> {
    tree: &'a DomTree,
    rules: &'a Rules,
    media: String,
    memo: HashMap<(NodeId, Property), Value>,
    inline: HashMap<NodeId, Declarations>,
}

impl<'a> StyleResolver<'a> {
    /// Resolver for `tree` styled by `rules`. The `style` attributes of all
    /// elements are parsed up front.
    #[must_use]
    pub fn new(tree: &'a DomTree, rules: &'a Rules) -> Self {
        let inline = tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter_map(|id| {
                let style = tree.attribute(id, "style")?;
                let declarations = Declarations::parse(style);
                (!declarations.is_empty()).then_some((id, declarations))
            })
            .collect();
        Self {
            tree,
            rules,
            media: DEFAULT_MEDIA.to_string(),
            memo: HashMap::new(),
            inline,
        }
    }

    /// Same resolver, for `media`.
    #[must_use]
    pub fn with_media(mut self, media: &str) -> Self {
        self.set_media(media);
        self
    }

    /// Media the rules are filtered by.
    #[must_use]
    pub fn media(&self) -> &str {
        &self.media
    }

    /// Switch to another media. The cache is dropped when the media changes.
    pub fn set_media(&mut self, media: &str) {
        if !self.media.eq_ignore_ascii_case(media) {
            media.clone_into(&mut self.media);
            self.clear();
        }
    }

    /// Forget every resolved value.
    pub fn clear(&mut self) {
        self.memo.clear();
    }

    /// Winning declared value for `property` on `node`, without inheritance
    /// or defaults. Empty when nothing applies.
    ///
    /// Rules are scanned from last to first. A candidate replaces the best
    /// value so far when there is none yet, when it is more specific and of
    /// equal importance, or when it is important and the best is not. The
    /// `style` attribute enters first with [`INLINE_SPECIFICITY`].
    #[must_use]
    pub fn find_css_value(&self, node: NodeId, property: Property) -> Value {
        if self.tree.as_element(node).is_none() {
            return Value::default();
        }
        let mut best: Option<(u32, &Value)> = self
            .inline
            .get(&node)
            .and_then(|declarations| declarations.get(property))
            .filter(|value| !value.is_empty())
            .map(|value| (INLINE_SPECIFICITY, value));

        for rule in self.rules.rules().iter().rev() {
            if !rule.applies_to(&self.media) {
                continue;
            }
            let Some(value) = rule
                .declarations
                .get(property)
                .filter(|value| !value.is_empty())
            else {
                continue;
            };
            for selector in &rule.selectors {
                if !selector.matches(self.tree, node) {
                    continue;
                }
                let specificity = selector.specificity();
                let replace = best.is_none_or(|(best_specificity, best_value)| {
                    (specificity > best_specificity && value.important == best_value.important)
                        || (value.important && !best_value.important)
                });
                if replace {
                    best = Some((specificity, value));
                }
            }
        }

        best.map(|(_, value)| value.clone()).unwrap_or_default()
    }

    /// Cascaded value of `property` on `node`, memoized.
    ///
    /// An empty value with `inherit` set, or an explicit `inherit`, takes the
    /// parent element's value (resolved with `inherit` set) and is flagged
    /// as inherited. What is still empty afterwards gets `default`.
    pub fn get_css_value(
        &mut self,
        node: NodeId,
        property: Property,
        inherit: bool,
        default: Option<&str>,
    ) -> Value {
        if let Some(value) = self.memo.get(&(node, property)) {
            return value.clone();
        }

        let mut value = self.find_css_value(node, property);
        if (value.is_empty() && inherit) || value.is("inherit") {
            let parent = self
                .tree
                .parent(node)
                .filter(|&parent| self.tree.as_element(parent).is_some());
            match parent {
                Some(parent) => {
                    value = Value {
                        inherited: true,
                        ..self.get_css_value(parent, property, true, default)
                    };
                }
                None => value.text.clear(),
            }
        }
        if let Some(default) = default.filter(|_| value.is_empty()) {
            default.clone_into(&mut value.text);
        }
        value.checked = true;

        let _ = self.memo.insert((node, property), value.clone());
        value
    }

    /// Cascaded value with the inheritance and default of the property
    /// table.
    pub fn get(&mut self, node: NodeId, property: Property) -> Value {
        self.get_css_value(node, property, property.inherited(), property.default_value())
    }

    /// The memoized value, if `property` was already resolved on `node`.
    #[must_use]
    pub fn cached(&self, node: NodeId, property: Property) -> Option<&Value> {
        self.memo.get(&(node, property))
    }

    /// Resolve every property of every element under `root` (inclusive).
    pub fn apply_css_rules(&mut self, root: NodeId) {
        let tree = self.tree;
        let nodes = std::iter::once(root).chain(tree.descendants(root));
        for node in nodes.filter(|&id| tree.as_element(id).is_some()) {
            for property in Property::iter() {
                let _ = self.get(node, property);
            }
        }
    }

    /// All resolved, non-empty values of `node`, in property order.
    #[must_use]
    pub fn resolved(&self, node: NodeId) -> BTreeMap<Property, Value> {
        self.memo
            .iter()
            .filter(|((id, _), value)| *id == node && !value.is_empty())
            .map(|(&(_, property), value)| (property, value.clone()))
            .collect()
    }

    /// Location of the background image declared for `node`, unmemoized.
    #[must_use]
    pub fn find_background_image(&self, node: NodeId) -> Option<String> {
        image_location(self.find_css_value(node, Property::BackgroundImage).as_str())
    }

    /// Location of the cascaded background image of `node`. The lookup is
    /// memoized (as `none` when there is no image).
    pub fn background_image(&mut self, node: NodeId) -> Option<String> {
        image_location(self.get(node, Property::BackgroundImage).as_str())
    }

    /// `display`
    pub fn display(&mut self, node: NodeId) -> Option<Display> {
        self.keyword(node, Property::Display)
    }

    /// `float`
    pub fn float(&mut self, node: NodeId) -> Option<Float> {
        self.keyword(node, Property::Float)
    }

    /// `position`
    pub fn position(&mut self, node: NodeId) -> Option<Position> {
        self.keyword(node, Property::Position)
    }

    /// `text-align`
    pub fn text_align(&mut self, node: NodeId) -> Option<TextAlign> {
        self.keyword(node, Property::TextAlign)
    }

    /// `white-space`
    pub fn white_space(&mut self, node: NodeId) -> Option<WhiteSpace> {
        self.keyword(node, Property::WhiteSpace)
    }

    /// `font-style`
    pub fn font_style(&mut self, node: NodeId) -> Option<FontStyle> {
        self.keyword(node, Property::FontStyle)
    }

    /// `list-style-type`
    pub fn list_style_type(&mut self, node: NodeId) -> Option<ListStyle> {
        self.keyword(node, Property::ListStyleType)
    }

    /// Border style of one side, falling back to `border-style` when the
    /// side is unset.
    pub fn border_style(&mut self, node: NodeId, side: Side) -> Option<BorderStyle> {
        let value = self.get(node, side.border_style());
        let value = if value.is_empty() {
            self.get(node, Property::BorderStyle)
        } else {
            value
        };
        value.as_str().parse().ok()
    }

    /// `color`
    pub fn color(&mut self, node: NodeId) -> Option<Color> {
        parse_color(self.get(node, Property::Color).as_str())
    }

    /// `background-color`; `None` for `transparent`.
    pub fn background_color(&mut self, node: NodeId) -> Option<Color> {
        parse_color(self.get(node, Property::BackgroundColor).as_str())
    }

    /// Border color of one side, then `border-color`, then `color`.
    pub fn border_color(&mut self, node: NodeId, side: Side) -> Option<Color> {
        parse_color(self.get(node, side.border_color()).as_str())
            .or_else(|| parse_color(self.get(node, Property::BorderColor).as_str()))
            .or_else(|| self.color(node))
    }

    /// Decorations of `node` combined with those of its ancestors. The walk
    /// stops at the first element whose own value contains `none`.
    pub fn text_decorations(&mut self, node: NodeId) -> Decorations {
        let tree = self.tree;
        let mut flags = Decorations::parse(self.get(node, Property::TextDecoration).as_str());
        if flags.none {
            return flags;
        }
        for ancestor in tree.ancestors(node) {
            if tree.as_element(ancestor).is_none() {
                continue;
            }
            let own = Decorations::parse(self.get(ancestor, Property::TextDecoration).as_str());
            if own.none {
                break;
            }
            flags = flags.union(own);
        }
        flags
    }

    fn keyword<T: std::str::FromStr>(&mut self, node: NodeId, property: Property) -> Option<T> {
        self.get(node, property).as_str().parse().ok()
    }
}

/// `url(...)` contents without quotes. `none`, an empty value and an
/// unterminated `url(` give no location.
fn image_location(value: &str) -> Option<String> {
    let value = value.trim();
    let rest = value
        .get(..4)
        .filter(|prefix| prefix.eq_ignore_ascii_case("url("))
        .map(|_| &value[4..])?;
    let inner = rest[..rest.find(')')?].trim();
    let inner = ['"', '\'']
        .into_iter()
        .find_map(|q| inner.strip_prefix(q)?.strip_suffix(q))
        .unwrap_or(inner);
    (!inner.is_empty()).then(|| inner.to_string())
}
