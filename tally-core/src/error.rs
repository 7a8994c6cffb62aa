//! Hard failures. Everything softer travels as a [`crate::Diagnostic`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatementError {
    /// The document could not be opened at all (missing file, corrupt
    /// cross-reference table, not a PDF).
    #[error("failed to open document {path}: {reason}")]
    Open { path: String, reason: String },

    /// A page opened but its text stream could not be decoded.
    #[error("failed to extract text from page {page}: {reason}")]
    TextExtraction { page: u32, reason: String },

    /// The table detection pass could not run.
    #[error("table detection failed: {0}")]
    TableDetection(String),

    /// A rule in a [`crate::RuleSet`] carries a pattern that does not compile.
    #[error("invalid pattern for rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A rule asks for more capture groups than its pattern defines.
    #[error("rule '{rule}' maps {wanted} captures but its pattern only has {available}")]
    CaptureMismatch {
        rule: String,
        wanted: usize,
        available: usize,
    },
}
