//! Keyword values of the typed style accessors.
//!
//! Each enum parses its CSS keywords case-insensitively through
//! `EnumString`; an unknown keyword is reported as `None` by the accessors.

use serde::Serialize;
use strum_macros::{EnumString, IntoStaticStr};

/// `display`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Display {
    None,
    Inline,
    InlineBlock,
    Block,
    ListItem,
    InlineTable,
    Table,
    TableHeaderGroup,
    TableRowGroup,
    TableFooterGroup,
    TableRow,
    TableCell,
}

/// `float`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Float {
    None,
    Left,
    Right,
}

/// `text-align`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// `position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
}

/// `border-style` and its per-side longhands
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum BorderStyle {
    None,
    Hidden,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

/// One token of `text-decoration`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum TextDecoration {
    None,
    Underline,
    LineThrough,
}

/// `font-style`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

/// `list-style-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum ListStyle {
    None,
    Circle,
    Disc,
    Square,
    Decimal,
    DecimalLeadingZero,
    UpperAlpha,
    LowerAlpha,
}

/// `white-space`
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Serialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum WhiteSpace {
    Normal,
    Nowrap,
    Pre,
    PreWrap,
    PreLine,
}

/// Accumulated `text-decoration` of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Decorations {
    /// `none` was seen; stops the walk up the ancestors
    pub none: bool,
    /// Draw a line under the text
    pub underline: bool,
    /// Draw a line through the text
    pub line_through: bool,
}

impl Decorations {
    /// Decorations named by one `text-decoration` value. `none` resets what
    /// came before it; unknown tokens are ignored.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut flags = Self::default();
        for token in value.split_ascii_whitespace() {
            match token.parse::<TextDecoration>() {
                Ok(TextDecoration::None) => {
                    flags = Self {
                        none: true,
                        ..Self::default()
                    };
                }
                Ok(TextDecoration::Underline) => flags.underline = true,
                Ok(TextDecoration::LineThrough) => flags.line_through = true,
                Err(_) => {}
            }
        }
        flags
    }

    /// Union of both flag sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            none: self.none || other.none,
            underline: self.underline || other.underline,
            line_through: self.line_through || other.line_through,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_parse_case_insensitively() {
        assert_eq!("TABLE-CELL".parse::<Display>().ok(), Some(Display::TableCell));
        assert_eq!("pre-wrap".parse::<WhiteSpace>().ok(), Some(WhiteSpace::PreWrap));
        assert_eq!(
            "decimal-leading-zero".parse::<ListStyle>().ok(),
            Some(ListStyle::DecimalLeadingZero)
        );
        assert!("sideways".parse::<Float>().is_err());
    }

    #[test]
    fn test_decorations() {
        let flags = Decorations::parse("underline line-through");
        assert!(flags.underline && flags.line_through && !flags.none);

        let reset = Decorations::parse("underline none");
        assert_eq!(
            reset,
            Decorations {
                none: true,
                ..Decorations::default()
            }
        );
        assert_eq!(Decorations::parse("blink"), Decorations::default());
    }
}
