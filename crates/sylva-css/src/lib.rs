//! CSS rule reading, selector matching and cascade resolution for the sylva
//! document engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer**
//!   - Identifiers, single-character delimiters, significant whitespace
//!   - `/* */` comments
//!
//! - **Rule Reader**
//!   - Selector groups with descendant, child (`>`) and sibling (`+`) combinators
//!   - Type, universal, class, ID and attribute selectors
//!   - Structural pseudo-classes (`first-child`, `last-child`, `root`, `empty`)
//!   - `@media` blocks
//!   - Declarations with `!important`
//!   - Shorthand expansion (background, border, margin, padding)
//!
//! - **Cascade**
//!   - Specificity and importance ordering, last rule wins ties
//!   - Inline `style` attributes
//!   - Inheritance and initial values from a fixed property table
//!   - Memoized per-element values in a side table
//!
//! - **Values**
//!   - Colors (`#rgb`, `#rrggbb`, `rgb()`, named colors)
//!   - Keywords (display, float, position, borders, decorations, ...)
//!
//! - **Style Sheet Discovery**
//!   - `<?xml-stylesheet?>`, `<style>` and `<link rel="stylesheet">`
//!
//! # Not Yet Implemented
//!
//! - Lengths and computed values (values are kept as written)
//! - `@import`, `@font-face` and other at-rules
//! - Dynamic pseudo-classes and pseudo-elements

/// Cascade resolution and typed style accessors.
pub mod cascade;
/// Color parsing.
pub mod color;
/// Declaration blocks and shorthand expansion.
pub mod declarations;
/// Keyword enums for the typed accessors.
pub mod keywords;
/// Rules and the style sheet reader.
pub mod rules;
/// Selector representation and matching.
pub mod selector;
/// Style sheet discovery in documents.
pub mod sources;
/// Character-level scanner.
pub mod tokenizer;
/// Property table and values.
pub mod values;

pub use cascade::{DEFAULT_MEDIA, StyleResolver};
pub use color::{Color, parse_color};
pub use declarations::Declarations;
pub use keywords::{
    BorderStyle, Decorations, Display, Float, FontStyle, ListStyle, Position, TextAlign,
    TextDecoration, WhiteSpace,
};
pub use rules::{Rule, Rules};
pub use selector::{Combinator, Selector, SelectorPart};
pub use sources::collect_rules;
pub use values::{Property, Side, Value};
