//! Element kinds and their content models.
//!
//! Every element carries an [`ElementKind`] chosen by the parser's factory.
//! The kind answers the structural questions the parser asks while building
//! the tree: may this child be placed here, is the element intrinsically
//! childless, is its content raw script text.

use crate::NodeType;

/// Tags that may appear wherever inline content is allowed.
pub const INLINE_TAGS: &[&str] = &[
    "A", "ABBR", "ACRONYM", "APPLET", "B", "BASEFONT", "BDO", "BIG", "BLINK", "BR", "BUTTON",
    "CITE", "CODE", "DEL", "DFN", "EM", "FONT", "I", "IMG", "INS", "INPUT", "IFRAME", "KBD",
    "LABEL", "MAP", "OBJECT", "Q", "SAMP", "SCRIPT", "SELECT", "SMALL", "SPAN", "STRIKE",
    "STRONG", "SUB", "SUP", "TEXTAREA", "TT", "U", "VAR",
];

/// Tags that may appear wherever block content is allowed (in addition to
/// [`INLINE_TAGS`]).
pub const BLOCK_TAGS: &[&str] = &[
    "ADDRESS", "BLOCKQUOTE", "CENTER", "DIR", "DIV", "DL", "FIELDSET", "FORM", "H1", "H2", "H3",
    "H4", "H5", "H6", "HR", "ISINDEX", "MENU", "NOFRAMES", "NOSCRIPT", "OL", "P", "PRE", "TABLE",
    "UL",
];

/// What an element may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Anything: text, elements, comments, processing instructions.
    /// Generic XML elements use this.
    Any,
    /// Nothing at all (`<br>`, `<img>`, ...).
    Empty,
    /// Character data only.
    Text,
    /// Character data and [`INLINE_TAGS`].
    Inline,
    /// Character data, [`INLINE_TAGS`] and [`BLOCK_TAGS`].
    Block,
    /// Only the listed tags, no character data.
    Only(&'static [&'static str]),
}

/// Structural behaviour of an element, fixed at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementKind {
    /// Base content model.
    pub model: ContentModel,
    /// Tags accepted on top of the model.
    pub also: &'static [&'static str],
    /// Tags rejected even though the model would accept them.
    pub except: &'static [&'static str],
    /// Content is read verbatim up to the end tag (`<script>`, `<style>`).
    pub raw_text: bool,
    /// Tag and id comparisons respect case (XML) or ignore it (HTML).
    pub case_sensitive: bool,
}

impl ElementKind {
    /// Generic XML element: accepts everything, case-sensitive.
    pub const ANY: Self = Self {
        model: ContentModel::Any,
        also: &[],
        except: &[],
        raw_text: false,
        case_sensitive: true,
    };

    /// HTML element with the given content model.
    #[must_use]
    pub const fn html(model: ContentModel) -> Self {
        Self {
            model,
            also: &[],
            except: &[],
            raw_text: false,
            case_sensitive: false,
        }
    }

    /// Additionally accept `tags`.
    #[must_use]
    pub const fn also(mut self, tags: &'static [&'static str]) -> Self {
        self.also = tags;
        self
    }

    /// Reject `tags` even if the model accepts them.
    #[must_use]
    pub const fn except(mut self, tags: &'static [&'static str]) -> Self {
        self.except = tags;
        self
    }

    /// Mark the element as holding raw script/style text.
    #[must_use]
    pub const fn raw_text(mut self) -> Self {
        self.raw_text = true;
        self
    }

    /// Intrinsically childless: the parser never recurses into it.
    #[must_use]
    pub const fn is_simple(&self) -> bool {
        matches!(self.model, ContentModel::Empty)
    }

    /// Whether a node of type `child` may be inserted into an element of this kind.
    #[must_use]
    pub fn accepts(&self, child: &NodeType) -> bool {
        match (self.model, child) {
            (ContentModel::Empty, _) | (_, NodeType::Document) => false,
            (ContentModel::Any, _) | (_, NodeType::Comment(_)) => true,
            (model, NodeType::Text(_) | NodeType::CData(_)) => matches!(
                model,
                ContentModel::Text | ContentModel::Inline | ContentModel::Block
            ),
            (model, NodeType::Element(element)) => {
                if element.prefix().is_some() {
                    return true;
                }
                let tag = element.tag_name.as_str();
                if contains_tag(self.except, tag) {
                    return false;
                }
                if contains_tag(self.also, tag) {
                    return true;
                }
                match model {
                    ContentModel::Inline => contains_tag(INLINE_TAGS, tag),
                    ContentModel::Block => {
                        contains_tag(INLINE_TAGS, tag) || contains_tag(BLOCK_TAGS, tag)
                    }
                    ContentModel::Only(tags) => contains_tag(tags, tag),
                    ContentModel::Text | ContentModel::Any | ContentModel::Empty => false,
                }
            }
            (_, _) => false,
        }
    }
}

impl Default for ElementKind {
    fn default() -> Self {
        Self::ANY
    }
}

fn contains_tag(tags: &[&str], tag: &str) -> bool {
    tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
}
