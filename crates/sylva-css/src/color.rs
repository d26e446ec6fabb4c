//! Color values.

use serde::Serialize;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

/// The named colors understood by [`parse_color`].
const NAMED_COLORS: [(&str, Color); 17] = [
    ("white", Color::rgb(255, 255, 255)),
    ("silver", Color::rgb(192, 192, 192)),
    ("gray", Color::rgb(128, 128, 128)),
    ("black", Color::rgb(0, 0, 0)),
    ("red", Color::rgb(255, 0, 0)),
    ("lime", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("aqua", Color::rgb(0, 255, 255)),
    ("fuchsia", Color::rgb(255, 0, 255)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("navy", Color::rgb(0, 0, 128)),
    ("olive", Color::rgb(128, 128, 0)),
    ("teal", Color::rgb(0, 128, 128)),
    ("purple", Color::rgb(128, 0, 128)),
    ("orange", Color::rgb(255, 102, 0)),
];

impl Color {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Color from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` or `#rgb` (the leading `#` is optional).
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => Some(Self::rgb(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            _ => None,
        }
    }

    /// One of the 17 basic color keywords.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(named, _)| named.eq_ignore_ascii_case(name))
            .map(|&(_, color)| color)
    }

    /// `#rrggbb` notation.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parse a color value: `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a named color.
///
/// `rgb()` takes exactly three components; a component ending in `%` is
/// scaled by 2.55, every component is clamped to `0..=255`. Anything else,
/// `transparent` included, is not a color.
#[must_use]
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();
    if text.starts_with('#') {
        return Color::from_hex(text);
    }
    if let Some(rest) = text.strip_prefix("rgb") {
        let inner = rest.trim().strip_prefix('(')?.strip_suffix(')')?;
        let components: Vec<&str> = inner.split(',').collect();
        let [r, g, b] = components.as_slice() else {
            return None;
        };
        return Some(Color::rgb(component(r), component(g), component(b)));
    }
    Color::from_named(text)
}

fn component(text: &str) -> u8 {
    let text = text.trim();
    let value = text
        .strip_suffix('%')
        .map_or_else(|| leading_integer(text), scale_percent);
    u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX)
}

/// `50%` of 255, rounded half up.
#[allow(clippy::cast_possible_truncation)]
fn scale_percent(percent: &str) -> i64 {
    (2.55 * percent.trim().parse::<f64>().unwrap_or(0.0) + 0.5) as i64
}

/// Integer prefix of `text` (`"12.7"` is 12, garbage is 0).
fn leading_integer(text: &str) -> i64 {
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert_eq!(parse_color("#ff8000"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(parse_color("#f80"), Some(Color::rgb(255, 136, 0)));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#gg0000"), None);
    }

    #[test]
    fn test_rgb_function() {
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
        assert_eq!(parse_color("rgb (300,-5, 12.7)"), Some(Color::rgb(255, 0, 12)));
        assert_eq!(parse_color("rgb(100%, 50%, 0%)"), Some(Color::rgb(255, 128, 0)));
        assert_eq!(parse_color("rgb(1, 2)"), None);
        assert_eq!(parse_color("rgb(1, 2, 3"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_color("orange"), Some(Color::rgb(255, 102, 0)));
        assert_eq!(parse_color("Navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(parse_color("transparent"), None);
        assert_eq!(Color::WHITE.to_hex(), "#ffffff");
    }
}
