//! Declaration blocks and shorthand expansion.

use std::collections::BTreeMap;

use sylva_common::warn_once;

use crate::tokenizer::{Token, Tokenizer, split_value};
use crate::values::{Property, Side, Value};

/// The property values declared by one rule (or one `style` attribute).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    values: BTreeMap<Property, Value>,
}

impl Declarations {
    /// Empty block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Parse a declaration list without braces, as found in a `style`
    /// attribute.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut declarations = Self::new();
        declarations.read(&mut Tokenizer::new(text));
        declarations
    }

    /// Read `name: value [!important]` pairs up to the closing `}` (consumed)
    /// or the end of input.
    pub(crate) fn read(&mut self, tokens: &mut Tokenizer) {
        loop {
            let name = match tokens.next_significant() {
                None | Some(Token::Delim('}')) => return,
                Some(Token::Delim(';')) => continue,
                Some(Token::Ident(name)) => name,
                Some(other) => {
                    let _ = warn_once("CSS", &format!("unexpected {other:?} in declaration block"));
                    if skip_value(tokens) {
                        return;
                    }
                    continue;
                }
            };

            match tokens.next_significant() {
                Some(Token::Delim(':')) => {}
                None | Some(Token::Delim('}')) => return,
                Some(_) => {
                    if skip_value(tokens) {
                        return;
                    }
                    continue;
                }
            }

            let (text, mut terminator) = tokens.read_value();
            let mut important = false;
            if terminator == Some('!') {
                let (flag, end) = tokens.read_value();
                important = flag.eq_ignore_ascii_case("important");
                terminator = end;
            }
            self.declare(&name, text, important);
            if terminator == Some('}') {
                return;
            }
        }
    }

    /// Declare `name: text`. Unknown properties are reported once and
    /// dropped; shorthands also assign their longhands.
    pub fn declare(&mut self, name: &str, text: impl Into<String>, important: bool) {
        let Ok(property) = name.parse::<Property>() else {
            let _ = warn_once("CSS", &format!("unsupported property '{name}'"));
            return;
        };
        self.set(property, Value::declared(text, important));
    }

    /// Assign a value, expanding shorthands.
    pub fn set(&mut self, property: Property, value: Value) {
        if property.is_shorthand() {
            self.expand(property, &value);
        }
        let _ = self.values.insert(property, value);
    }

    /// The declared value of `property`.
    #[must_use]
    pub fn get(&self, property: Property) -> Option<&Value> {
        self.values.get(&property)
    }

    /// All declared values in property order.
    pub fn entries(&self) -> impl Iterator<Item = (Property, &Value)> {
        self.values.iter().map(|(&property, value)| (property, value))
    }

    /// Number of declared properties, expanded longhands included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Nothing declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Assign the longhands of `shorthand` from the parts of its value.
    ///
    /// Positional shorthands (`background`, `border`, `border-<side>`) take
    /// their parts in order and clear longhands without a part. Box
    /// shorthands use the 1 to 4 value rule.
    fn expand(&mut self, shorthand: Property, value: &Value) {
        let parts = split_value(&value.text);
        match shorthand {
            Property::Background => self.assign_in_order(
                &[Property::BackgroundColor, Property::BackgroundImage],
                &parts,
                value,
            ),
            Property::Border => {
                let longhands = [
                    Property::BorderWidth,
                    Property::BorderStyle,
                    Property::BorderColor,
                ];
                self.assign_in_order(&longhands, &parts, value);
                for longhand in longhands {
                    if let Some(expanded) = self.values.get(&longhand).cloned() {
                        self.expand(longhand, &expanded);
                    }
                }
            }
            Property::BorderTop
            | Property::BorderRight
            | Property::BorderBottom
            | Property::BorderLeft => {
                let Some(side) = Side::ALL.into_iter().find(|side| side.border() == shorthand)
                else {
                    return;
                };
                self.assign_in_order(
                    &[side.border_width(), side.border_style(), side.border_color()],
                    &parts,
                    value,
                );
            }
            Property::BorderWidth => self.assign_sides(Side::border_width, &parts, value),
            Property::BorderStyle => self.assign_sides(Side::border_style, &parts, value),
            Property::BorderColor => self.assign_sides(Side::border_color, &parts, value),
            Property::Margin => self.assign_sides(Side::margin, &parts, value),
            Property::Padding => self.assign_sides(Side::padding, &parts, value),
            _ => {}
        }
    }

    fn assign_in_order(&mut self, longhands: &[Property], parts: &[String], source: &Value) {
        for (i, &longhand) in longhands.iter().enumerate() {
            let text = parts.get(i).map_or("", String::as_str);
            let _ = self.values.insert(longhand, expanded(text, source));
        }
    }

    fn assign_sides(&mut self, longhand: fn(Side) -> Property, parts: &[String], source: &Value) {
        let [top, right, bottom, left] = four_sides(parts);
        for (side, text) in Side::ALL.into_iter().zip([top, right, bottom, left]) {
            let _ = self.values.insert(longhand(side), expanded(text, source));
        }
    }
}

/// Top, right, bottom and left from one to four values.
fn four_sides(parts: &[String]) -> [&str; 4] {
    match parts {
        [] => [""; 4],
        [all] => [all.as_str(); 4],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal].map(String::as_str),
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal].map(String::as_str),
        [top, right, bottom, left, ..] => [top, right, bottom, left].map(String::as_str),
    }
}

fn expanded(text: &str, source: &Value) -> Value {
    Value {
        by_short_form: true,
        ..Value::declared(text, source.important)
    }
}

/// Skip the rest of a malformed declaration. Returns whether the block ended.
fn skip_value(tokens: &mut Tokenizer) -> bool {
    loop {
        let (_, terminator) = tokens.read_value();
        match terminator {
            Some(';') => return false,
            Some('!') => {}
            _ => return true,
        }
    }
}
