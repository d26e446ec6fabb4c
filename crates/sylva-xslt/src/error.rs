//! Transformer errors.

use sylva_common::LoadError;
use thiserror::Error;

/// Why a transformation could not start or finish.
#[derive(Debug, Error)]
pub enum XsltError {
    /// The source document names no `text/xsl` style sheet
    #[error("document has no text/xsl stylesheet reference")]
    NoStylesheetReference,
    /// The style sheet could not be fetched
    #[error("failed to load stylesheet: {0}")]
    Load(#[from] LoadError),
    /// The style sheet document has no `xsl:stylesheet` root element
    #[error("no xsl:stylesheet element in {0}")]
    MissingStylesheetRoot(String),
    /// No template produced a result document
    #[error("transformation produced no output document")]
    NoOutput,
}
