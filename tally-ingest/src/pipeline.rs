//! The full extraction pipeline: text, normalization, fields, transactions.

use serde::Serialize;
use std::path::Path;
use tally_core::{
    Diagnostic, FieldExtractor, RuleSet, StatementError, StatementRecord, normalize,
};

use crate::document::StatementDocument;
use crate::stream_table::DetectionOptions;
use crate::table_extractor::{TableExtractor, TableIdentity};
use crate::text::extract_text;

/// A parsed statement together with everything that went missing on the way.
#[derive(Debug, Clone, Serialize)]
pub struct StatementReport {
    pub record: StatementRecord,
    pub diagnostics: Vec<Diagnostic>,
    /// The table the transactions were read from, if any.
    pub table: Option<TableIdentity>,
}

impl StatementReport {
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct StatementParser {
    fields: FieldExtractor,
    tables: TableExtractor,
}

impl StatementParser {
    /// Compiles `rules`; fails only if a field rule is invalid.
    pub fn new(rules: &RuleSet, options: DetectionOptions) -> Result<Self, StatementError> {
        Ok(Self {
            fields: FieldExtractor::from_rule_set(rules)?,
            tables: TableExtractor::new(rules.clone(), options),
        })
    }

    pub fn with_defaults() -> Result<Self, StatementError> {
        Self::new(&RuleSet::default(), DetectionOptions::default())
    }

    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<StatementReport, StatementError> {
        let doc = StatementDocument::open(path)?;
        self.parse_document(&doc)
    }

    pub fn parse_bytes(&self, bytes: &[u8], source: &str) -> Result<StatementReport, StatementError> {
        let doc = StatementDocument::from_bytes(bytes, source)?;
        self.parse_document(&doc)
    }

    /// Runs every stage over an opened document.
    ///
    /// Only a text decoding failure aborts; field and table problems come
    /// back as diagnostics next to a record with explicit absences.
    pub fn parse_document(&self, doc: &StatementDocument) -> Result<StatementReport, StatementError> {
        log::info!("parsing {} ({} pages)", doc.source(), doc.page_count());

        let (raw_text, mut diagnostics) = extract_text(doc).into_result()?;
        let text = normalize(&raw_text);

        let (fields, field_diagnostics) = self.fields.extract(&text).into_result()?;
        diagnostics.extend(field_diagnostics);

        let extraction = self.tables.extract(doc);
        let (transactions, table_diagnostics) = extraction.transactions.degrade(Vec::new, |e| {
            Diagnostic::TableDetectionFailed {
                reason: e.to_string(),
            }
        });
        diagnostics.extend(table_diagnostics);

        let record = StatementRecord::assemble(fields, transactions);
        log::info!(
            "{}: {} transactions, {} diagnostic(s)",
            doc.source(),
            record.transactions.len(),
            diagnostics.len()
        );

        Ok(StatementReport {
            record,
            diagnostics,
            table: extraction.table,
        })
    }
}
