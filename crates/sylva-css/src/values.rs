//! Property table and cascaded values.

use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A CSS property known to the engine.
///
/// The table is fixed: each property knows whether it is inherited, whether
/// it is a shorthand that expands into longhands, and its initial value.
/// Names parse case-insensitively (`"Border-Top-Color".parse()`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Property {
    Background,
    BackgroundColor,
    BackgroundImage,
    Border,
    BorderColor,
    BorderBottom,
    BorderBottomColor,
    BorderBottomStyle,
    BorderBottomWidth,
    BorderLeft,
    BorderLeftColor,
    BorderLeftStyle,
    BorderLeftWidth,
    BorderTop,
    BorderTopColor,
    BorderTopStyle,
    BorderTopWidth,
    BorderRight,
    BorderRightColor,
    BorderRightStyle,
    BorderRightWidth,
    BorderStyle,
    BorderWidth,
    Bottom,
    Color,
    Display,
    Float,
    FontFamily,
    FontSize,
    FontStyle,
    FontWeight,
    Height,
    Left,
    LetterSpacing,
    LineHeight,
    ListStyleType,
    Margin,
    MarginLeft,
    MarginRight,
    MarginTop,
    MarginBottom,
    Padding,
    PaddingBottom,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    Position,
    Right,
    TextAlign,
    TextDecoration,
    TextIndent,
    Top,
    WhiteSpace,
    Width,
}

impl Property {
    /// Whether an unset value is taken from the parent element.
    #[must_use]
    pub const fn inherited(self) -> bool {
        matches!(
            self,
            Self::BackgroundColor
                | Self::Color
                | Self::FontFamily
                | Self::FontSize
                | Self::FontStyle
                | Self::FontWeight
                | Self::LetterSpacing
                | Self::LineHeight
                | Self::ListStyleType
                | Self::TextAlign
                | Self::TextIndent
        )
    }

    /// Whether a declaration of this property expands into longhands.
    #[must_use]
    pub const fn is_shorthand(self) -> bool {
        matches!(
            self,
            Self::Background
                | Self::Border
                | Self::BorderColor
                | Self::BorderBottom
                | Self::BorderLeft
                | Self::BorderTop
                | Self::BorderRight
                | Self::BorderStyle
                | Self::BorderWidth
                | Self::Margin
                | Self::Padding
        )
    }

    /// Value used when neither a rule nor inheritance supplies one.
    #[must_use]
    pub const fn default_value(self) -> Option<&'static str> {
        match self {
            Self::BackgroundColor => Some("transparent"),
            Self::BackgroundImage
            | Self::BorderBottomStyle
            | Self::BorderLeftStyle
            | Self::BorderTopStyle
            | Self::BorderRightStyle
            | Self::Float => Some("none"),
            Self::Display => Some("inline"),
            Self::Position => Some("static"),
            Self::TextAlign => Some("left"),
            Self::WhiteSpace => Some("normal"),
            _ => None,
        }
    }

    /// CSS name of the property.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// One edge of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All four sides in shorthand order (top, right, bottom, left).
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// `border-<side>` shorthand.
    #[must_use]
    pub const fn border(self) -> Property {
        match self {
            Self::Top => Property::BorderTop,
            Self::Right => Property::BorderRight,
            Self::Bottom => Property::BorderBottom,
            Self::Left => Property::BorderLeft,
        }
    }

    /// `border-<side>-color`.
    #[must_use]
    pub const fn border_color(self) -> Property {
        match self {
            Self::Top => Property::BorderTopColor,
            Self::Right => Property::BorderRightColor,
            Self::Bottom => Property::BorderBottomColor,
            Self::Left => Property::BorderLeftColor,
        }
    }

    /// `border-<side>-style`.
    #[must_use]
    pub const fn border_style(self) -> Property {
        match self {
            Self::Top => Property::BorderTopStyle,
            Self::Right => Property::BorderRightStyle,
            Self::Bottom => Property::BorderBottomStyle,
            Self::Left => Property::BorderLeftStyle,
        }
    }

    /// `border-<side>-width`.
    #[must_use]
    pub const fn border_width(self) -> Property {
        match self {
            Self::Top => Property::BorderTopWidth,
            Self::Right => Property::BorderRightWidth,
            Self::Bottom => Property::BorderBottomWidth,
            Self::Left => Property::BorderLeftWidth,
        }
    }

    /// `margin-<side>`.
    #[must_use]
    pub const fn margin(self) -> Property {
        match self {
            Self::Top => Property::MarginTop,
            Self::Right => Property::MarginRight,
            Self::Bottom => Property::MarginBottom,
            Self::Left => Property::MarginLeft,
        }
    }

    /// `padding-<side>`.
    #[must_use]
    pub const fn padding(self) -> Property {
        match self {
            Self::Top => Property::PaddingTop,
            Self::Right => Property::PaddingRight,
            Self::Bottom => Property::PaddingBottom,
            Self::Left => Property::PaddingLeft,
        }
    }
}

/// A declared or cascaded property value.
///
/// An empty `text` means "not set". The flags record how the value was
/// obtained; they never take part in keyword comparisons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Value {
    /// Raw value text as written in the style sheet
    pub text: String,
    /// Declared with `!important`
    pub important: bool,
    /// Copied from the parent element
    pub inherited: bool,
    /// Produced by expanding a shorthand
    pub by_short_form: bool,
    /// Resolved and memoized by the cascade
    #[serde(skip)]
    pub checked: bool,
}

impl Value {
    /// Plain value without flags.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Value as written in a declaration.
    #[must_use]
    pub fn declared(text: impl Into<String>, important: bool) -> Self {
        Self {
            text: text.into(),
            important,
            ..Self::default()
        }
    }

    /// No text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The value text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Case-insensitive keyword comparison.
    #[must_use]
    pub fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_property_names_round_trip() {
        for property in Property::iter() {
            assert_eq!(property.name().parse::<Property>().ok(), Some(property));
        }
        assert_eq!(Property::BorderTopColor.name(), "border-top-color");
        assert_eq!(
            "Background-Image".parse::<Property>().ok(),
            Some(Property::BackgroundImage)
        );
        assert!("-webkit-box".parse::<Property>().is_err());
    }

    #[test]
    fn test_property_table() {
        assert!(Property::Color.inherited());
        assert!(!Property::Display.inherited());
        assert!(Property::Margin.is_shorthand());
        assert!(!Property::MarginTop.is_shorthand());
        assert_eq!(Property::Display.default_value(), Some("inline"));
        assert_eq!(Property::BorderLeftStyle.default_value(), Some("none"));
        assert_eq!(Property::Color.default_value(), None);
    }

    #[test]
    fn test_value_keyword_comparison() {
        let value = Value::declared("Inherit", true);
        assert!(value.is("inherit"));
        assert!(value.important);
        assert!(Value::default().is_empty());
    }
}
