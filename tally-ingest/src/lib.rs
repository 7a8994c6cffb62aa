//! tally-ingest: reads statement PDFs and runs the extraction pipeline.
//!
//! Text comes from each page's text operators in page order; the transaction
//! table is found independently by laying out positioned text runs and
//! looking for whitespace-aligned columns.

pub mod document;
pub mod layout;
pub mod pipeline;
pub mod stream_table;
pub mod table_extractor;
pub mod text;

pub use document::StatementDocument;
pub use layout::{PageFonts, TextBox};
pub use pipeline::{StatementParser, StatementReport};
pub use stream_table::{DetectedTable, DetectionOptions};
pub use table_extractor::{TableExtraction, TableExtractor, TableIdentity, extract_transactions};
pub use text::extract_text;
