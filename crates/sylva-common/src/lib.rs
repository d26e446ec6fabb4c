//! Common utilities for the sylva document engine.
//!
//! This crate provides shared infrastructure used by the parser, the CSS
//! engine and the XSLT transformer:
//! - **Warning System** - deduplicated, colored notices for unsupported input
//! - **Resource Loading** - files, `http(s)` URLs and `data:` URLs
//! - **Location Resolution** - relative references against a document location

pub mod loader;
pub mod net;
pub mod url;
pub mod warning;

pub use loader::{DefaultLoader, LoadError, Resource, ResourceLoader};
pub use url::resolve_reference;
pub use warning::{clear_warnings, warn_once};
