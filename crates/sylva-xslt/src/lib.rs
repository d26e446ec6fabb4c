//! XSLT transformer for the sylva document engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selection Paths**
//!   - Child steps, `//`, `..`, `@attribute`, `text()`, `*`
//!   - Axes: child, descendant, following, following-sibling, preceding,
//!     preceding-sibling, self, parent
//!   - Position and expression predicates
//!
//! - **Expressions**
//!   - Integer arithmetic (`+ - * div mod %`)
//!   - String comparison (`= !=`) and boolean logic (`and or && ||`)
//!   - `position()` and `last()`
//!
//! - **Templates**
//!   - `match` and `mode`, narrowest match set wins
//!   - Built-in rule for unmatched nodes
//!   - `value-of`, `attribute`, `text`, `if`, `apply-templates`, `copy-of`,
//!     `for-each`, `processing-instruction`, literal result elements
//!
//! - **Output**
//!   - `xsl:output` method, version, DOCTYPE and declaration settings
//!   - HTML `META` charset injection
//!
//! # Not Yet Implemented
//!
//! - Named templates, variables and parameters
//! - `xsl:import` / `xsl:include` precedence
//! - String and node-set functions beyond `position()` and `last()`

/// Transformer errors.
pub mod error;
/// Style sheet model and output settings.
pub mod stylesheet;
/// Template application.
pub mod transformer;
/// Selection paths and expressions.
pub mod xpath;

pub use error::XsltError;
pub use stylesheet::{
    OUTPUT_ENCODING, Output, OutputMethod, OutputSettings, Stylesheet, Template, XSLT_NAMESPACE,
};
pub use transformer::{DEFAULT_MAX_DEPTH, TransformOptions, Transformer};
pub use xpath::{Located, NodeSet, evaluate, locate, truthy, value_of};
