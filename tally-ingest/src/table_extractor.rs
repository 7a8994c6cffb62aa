//! Transaction extraction from the statement's ledger table.

use lopdf::content::Operation;
use serde::Serialize;
use std::fmt;
use tally_core::{
    Diagnostic, Outcome, RuleSet, StatementError, TransactionRecord, transactions_from_table,
};

use crate::document::StatementDocument;
use crate::layout::{PageFonts, layout_text};
use crate::stream_table::{DetectedTable, DetectionOptions, detect_tables};

/// A page's operators and font encodings, ready for layout.
type PageContent = (Vec<Operation>, PageFonts);

/// Which detected table was taken as the ledger.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TableIdentity {
    pub page: u32,
    /// Position in detection order across the whole document.
    pub index: usize,
    pub rows: usize,
    pub columns: usize,
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table #{} on page {} ({} rows x {} columns)",
            self.index, self.page, self.rows, self.columns
        )
    }
}

/// Result of one table extraction run. `transactions` is never `Err`.
#[derive(Debug)]
pub struct TableExtraction {
    pub transactions: Outcome<Vec<TransactionRecord>>,
    pub table: Option<TableIdentity>,
}

#[derive(Debug, Clone, Default)]
pub struct TableExtractor {
    rules: RuleSet,
    options: DetectionOptions,
}

impl TableExtractor {
    pub fn new(rules: RuleSet, options: DetectionOptions) -> Self {
        Self { rules, options }
    }

    /// Runs stream detection on every page.
    ///
    /// Pages whose content cannot be read are skipped with a diagnostic;
    /// only when no page at all can be read does detection fail.
    pub fn detect(&self, doc: &StatementDocument) -> Outcome<Vec<DetectedTable>> {
        let pages = doc.page_numbers().into_iter().map(|page| {
            let content = doc
                .page_operations(page)
                .map(|ops| (ops, doc.page_fonts(page)));
            (page, content)
        });
        self.detect_pages(doc.source(), pages)
    }

    fn detect_pages(
        &self,
        source: &str,
        pages: impl IntoIterator<Item = (u32, Result<PageContent, StatementError>)>,
    ) -> Outcome<Vec<DetectedTable>> {
        let mut tables = Vec::new();
        let mut diagnostics = Vec::new();
        let mut seen = 0;

        for (page, content) in pages {
            seen += 1;
            match content {
                Ok((ops, fonts)) => {
                    let boxes = layout_text(&ops, &fonts, self.options.glyph_width_ratio);
                    let found = detect_tables(page, &boxes, &self.options);
                    log::debug!(
                        "page {page}: {} text runs, {} table(s)",
                        boxes.len(),
                        found.len()
                    );
                    tables.extend(found);
                }
                Err(e) => {
                    log::warn!("skipping page {page} during table detection: {e}");
                    diagnostics.push(Diagnostic::PageSkipped {
                        page,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if seen > 0 && diagnostics.len() == seen {
            return Outcome::Err(StatementError::TableDetection(format!(
                "no page content of {source} could be read"
            )));
        }

        Outcome::from_parts(tables, diagnostics)
    }

    /// Detects tables, picks the ledger and converts its rows.
    ///
    /// Every failure degrades to an empty sequence with diagnostics.
    pub fn extract(&self, doc: &StatementDocument) -> TableExtraction {
        self.ledger_from(doc.source(), self.detect(doc))
    }

    fn ledger_from(&self, source: &str, detected: Outcome<Vec<DetectedTable>>) -> TableExtraction {
        let (tables, mut diagnostics) = detected.degrade(Vec::new, |e| {
            log::warn!("an error occurred during transaction extraction: {e}");
            Diagnostic::TableDetectionFailed {
                reason: e.to_string(),
            }
        });

        let Some(index) = select_largest(&tables) else {
            if !diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::TableDetectionFailed { .. }))
            {
                log::warn!("no tables found in {source}");
                diagnostics.push(Diagnostic::NoTablesDetected);
            }
            return TableExtraction {
                transactions: Outcome::Partial(Vec::new(), diagnostics),
                table: None,
            };
        };

        let table = &tables[index];
        let identity = TableIdentity {
            page: table.page,
            index,
            rows: table.row_count(),
            columns: table.columns,
        };
        log::info!("using {identity} of {} detected as the ledger", tables.len());

        let (transactions, row_diagnostics) = transactions_from_table(&table.rows, &self.rules)
            .degrade(Vec::new, |e| Diagnostic::TableDetectionFailed {
                reason: e.to_string(),
            });
        diagnostics.extend(row_diagnostics);
        log::debug!("extracted {} transactions", transactions.len());

        TableExtraction {
            transactions: Outcome::from_parts(transactions, diagnostics),
            table: Some(identity),
        }
    }
}

/// Index of the table with the most rows; ties go to the earliest.
pub fn select_largest(tables: &[DetectedTable]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, table) in tables.iter().enumerate() {
        match best {
            Some(b) if tables[b].row_count() >= table.row_count() => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Extracts the transaction sequence with the default rules and options.
pub fn extract_transactions(doc: &StatementDocument) -> Outcome<Vec<TransactionRecord>> {
    TableExtractor::default().extract(doc).transactions
}
