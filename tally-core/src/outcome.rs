//! Result-with-diagnostics type returned by every pipeline stage.
//!
//! A stage either finishes cleanly ([`Outcome::Ok`]), finishes with a reduced
//! value and a list of soft failures ([`Outcome::Partial`]), or cannot produce
//! a value at all ([`Outcome::Err`]). Only the last one may halt the pipeline.

use serde::Serialize;
use std::fmt;

use crate::error::StatementError;
use crate::fields::FieldKey;
use crate::rules::ColumnRole;

/// Why a table row did not become a transaction.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowDropReason {
    /// A mapped cell (date, description or amount) is missing or blank.
    IncompleteRow,
    /// Nothing numeric was left after cleaning the amount cell.
    NoAmount,
    /// The cleaned amount is not a plain decimal (e.g. `1.2.3`).
    MalformedAmount,
}

impl fmt::Display for RowDropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowDropReason::IncompleteRow => f.write_str("missing date, description or amount"),
            RowDropReason::NoAmount => f.write_str("no usable amount"),
            RowDropReason::MalformedAmount => f.write_str("malformed amount"),
        }
    }
}

/// A soft failure: the pipeline continued, the result is incomplete.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The document opened but yielded only whitespace (likely image-only).
    NoExtractableText { pages: usize },
    FieldNotFound { field: FieldKey },
    NoTablesDetected,
    /// No row mentioned `date` or `description`; row 0 was used as header.
    HeaderRowNotFound,
    MissingColumnRoles {
        missing: Vec<ColumnRole>,
        found: Vec<String>,
    },
    RowDropped { row: usize, reason: RowDropReason },
    TableDetectionFailed { reason: String },
    /// A page's content stream could not be read during table detection.
    PageSkipped { page: u32, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoExtractableText { pages } => write!(
                f,
                "no text could be extracted from {pages} page(s); the PDF may be image-based"
            ),
            Diagnostic::FieldNotFound { field } => write!(f, "field '{field}' not found"),
            Diagnostic::NoTablesDetected => f.write_str("no tables detected"),
            Diagnostic::HeaderRowNotFound => {
                f.write_str("could not find transaction table header; using row 0")
            }
            Diagnostic::MissingColumnRoles { missing, found } => {
                let missing: Vec<_> = missing.iter().map(|r| r.as_str()).collect();
                write!(
                    f,
                    "failed to map essential columns (missing: {}); found columns: {:?}",
                    missing.join(", "),
                    found
                )
            }
            Diagnostic::RowDropped { row, reason } => write!(f, "row {row} dropped: {reason}"),
            Diagnostic::TableDetectionFailed { reason } => {
                write!(f, "transaction extraction failed: {reason}")
            }
            Diagnostic::PageSkipped { page, reason } => {
                write!(f, "page {page} skipped during table detection: {reason}")
            }
        }
    }
}

#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Partial(T, Vec<Diagnostic>),
    Err(StatementError),
}

impl<T> Outcome<T> {
    /// `Ok` when `diagnostics` is empty, `Partial` otherwise.
    pub fn from_parts(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        if diagnostics.is_empty() {
            Outcome::Ok(value)
        } else {
            Outcome::Partial(value, diagnostics)
        }
    }

    pub fn partial(value: T, diagnostic: Diagnostic) -> Self {
        Outcome::Partial(value, vec![diagnostic])
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Ok(v) | Outcome::Partial(v, _) => Some(v),
            Outcome::Err(_) => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Outcome::Partial(_, d) => d,
            _ => &[],
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Ok(v) => Outcome::Ok(f(v)),
            Outcome::Partial(v, d) => Outcome::Partial(f(v), d),
            Outcome::Err(e) => Outcome::Err(e),
        }
    }

    /// Splits into value and diagnostics, propagating a hard failure.
    pub fn into_result(self) -> Result<(T, Vec<Diagnostic>), StatementError> {
        match self {
            Outcome::Ok(v) => Ok((v, Vec::new())),
            Outcome::Partial(v, d) => Ok((v, d)),
            Outcome::Err(e) => Err(e),
        }
    }

    /// Splits into value and diagnostics, replacing a hard failure with
    /// `fallback` and the diagnostic `on_err` builds from it.
    pub fn degrade(
        self,
        fallback: impl FnOnce() -> T,
        on_err: impl FnOnce(StatementError) -> Diagnostic,
    ) -> (T, Vec<Diagnostic>) {
        match self.into_result() {
            Ok(parts) => parts,
            Err(e) => (fallback(), vec![on_err(e)]),
        }
    }
}
