//! tally-report: everything written out after a statement is parsed.
//!
//! JSON and CSV exports, the plain-text and PDF summaries, and a generator
//! for fake statement PDFs used in demos and tests.

pub mod canvas;
pub mod error;
pub mod export;
pub mod sample;
pub mod summary;

pub use canvas::{Canvas, Font};
pub use error::ReportError;
pub use export::{save_json, to_json_string, write_csv};
pub use sample::{sample_statement, write_sample_statement};
pub use summary::{Totals, render_text, summary_canvas, write_summary_pdf};
