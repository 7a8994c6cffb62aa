use thiserror::Error;

/// Failure while writing a report. Never affects the parsed record.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] lopdf::Error),
}
