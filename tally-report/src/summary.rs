//! Human-readable statement summaries: terminal text and a summary PDF.

use chrono::NaiveDate;
use std::path::Path;
use tally_core::{StatementRecord, format_minor_units};

use crate::canvas::{Canvas, Font, MARGIN, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::ReportError;

const NOT_AVAILABLE: &str = "N/A";
const DESCRIPTION_WIDTH: usize = 44;
const LINE_HEIGHT: i64 = 16;

/// Debit and credit totals, in hundredths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub debits: i64,
    pub credits: i64,
    pub debit_count: usize,
    pub credit_count: usize,
    /// Amounts with more than two decimals, left out of the sums.
    pub unsummed: usize,
}

impl Totals {
    pub fn of(record: &StatementRecord) -> Self {
        let mut totals = Totals::default();
        for txn in &record.transactions {
            let Some(minor) = txn.amount_minor_units() else {
                totals.unsummed += 1;
                continue;
            };
            if txn.is_credit() {
                totals.credits += minor;
                totals.credit_count += 1;
            } else {
                totals.debits += minor;
                totals.debit_count += 1;
            }
        }
        totals
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn money(value: Option<&str>, currency: &str) -> String {
    match value {
        Some(v) => format!("{currency}{v}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn period(record: &StatementRecord) -> String {
    format!(
        "{} to {}",
        or_na(record.statement_period.from.as_deref()),
        or_na(record.statement_period.to.as_deref())
    )
}

/// Label/value pairs shown at the top of every summary.
fn key_rows(record: &StatementRecord, currency: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Card (last 4)", or_na(record.card_last4.as_deref())),
        ("Statement period", period(record)),
        ("Payment due date", or_na(record.payment_due_date.as_deref())),
        ("Total amount due", money(record.total_due.as_deref(), currency)),
        ("Minimum payment due", money(record.minimum_due.as_deref(), currency)),
    ]
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Plain-text summary for the terminal.
pub fn render_text(record: &StatementRecord, currency: &str) -> String {
    let mut out = String::new();
    out.push_str("Credit Card Statement Summary\n");
    out.push_str("=============================\n");
    for (label, value) in key_rows(record, currency) {
        out.push_str(&format!("{label:<22}{value}\n"));
    }

    let totals = Totals::of(record);
    out.push_str(&format!(
        "\nTransactions: {} ({} debit, {} credit)\n",
        record.transactions.len(),
        totals.debit_count,
        totals.credit_count
    ));
    for txn in &record.transactions {
        out.push_str(&format!(
            "  {:<12}{:<width$}  {:>7}  {currency}{}\n",
            txn.date,
            truncate(&txn.description, DESCRIPTION_WIDTH),
            txn.kind.to_string(),
            txn.amount,
            width = DESCRIPTION_WIDTH
        ));
    }
    if !record.transactions.is_empty() {
        out.push_str(&format!(
            "{:<22}{currency}{}\n{:<22}{currency}{}\n",
            "Total debits",
            format_minor_units(totals.debits),
            "Total credits",
            format_minor_units(totals.credits)
        ));
    }
    out
}

/// Lays out the summary PDF: a key table, then the transactions, paginated
/// with the column header repeated on every page.
pub fn summary_canvas(record: &StatementRecord, currency: &str, generated: NaiveDate) -> Canvas {
    let mut canvas = Canvas::new();
    let top = PAGE_HEIGHT - MARGIN;
    let value_x = MARGIN + 180;
    let columns = [MARGIN, MARGIN + 90, MARGIN + 380, MARGIN + 440];

    canvas.text(Font::Bold, 18, MARGIN, top, "Credit Card Statement Summary");
    canvas.text(
        Font::Regular,
        9,
        MARGIN,
        top - 16,
        &format!("Generated {}", generated.format("%Y-%m-%d")),
    );
    canvas.rule(MARGIN, PAGE_WIDTH - MARGIN, top - 24);

    let mut y = top - 48;
    for (label, value) in key_rows(record, currency) {
        canvas.text(Font::Bold, 11, MARGIN, y, label);
        canvas.text(Font::Regular, 11, value_x, y, &value);
        y -= LINE_HEIGHT;
    }

    y -= LINE_HEIGHT;
    canvas.text(Font::Bold, 14, MARGIN, y, "Transactions");
    y -= LINE_HEIGHT + 4;

    let header = |canvas: &mut Canvas, y: i64| {
        for (x, label) in columns.iter().zip(["Date", "Description", "Type", "Amount"]) {
            canvas.text(Font::Bold, 10, *x, y, label);
        }
        canvas.rule(MARGIN, PAGE_WIDTH - MARGIN, y - 4);
    };

    if record.transactions.is_empty() {
        canvas.text(Font::Regular, 10, MARGIN, y, "No transactions found.");
        return canvas;
    }

    header(&mut canvas, y);
    y -= LINE_HEIGHT;
    for txn in &record.transactions {
        if y < MARGIN {
            canvas.new_page();
            y = top;
            header(&mut canvas, y);
            y -= LINE_HEIGHT;
        }
        let cells = [
            txn.date.clone(),
            truncate(&txn.description, DESCRIPTION_WIDTH),
            txn.kind.to_string(),
            format!("{currency}{}", txn.amount),
        ];
        for (x, cell) in columns.iter().zip(cells) {
            canvas.text(Font::Regular, 10, *x, y, &cell);
        }
        y -= LINE_HEIGHT;
    }

    if y < MARGIN + LINE_HEIGHT {
        canvas.new_page();
        y = top;
    }
    let totals = Totals::of(record);
    canvas.rule(MARGIN, PAGE_WIDTH - MARGIN, y + 10);
    canvas.text(
        Font::Bold,
        10,
        MARGIN,
        y - 4,
        &format!(
            "Total debits {currency}{}    Total credits {currency}{}",
            format_minor_units(totals.debits),
            format_minor_units(totals.credits)
        ),
    );
    canvas
}

pub fn write_summary_pdf(
    record: &StatementRecord,
    currency: &str,
    path: impl AsRef<Path>,
) -> Result<(), ReportError> {
    let path = path.as_ref();
    let today = chrono::Local::now().date_naive();
    summary_canvas(record, currency, today).save(path)?;
    log::debug!("wrote summary PDF to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{StatementPeriod, TransactionRecord, TransactionType};

    fn txn(date: &str, description: &str, amount: &str, kind: TransactionType) -> TransactionRecord {
        TransactionRecord {
            date: date.to_string(),
            description: description.to_string(),
            amount: amount.to_string(),
            kind,
        }
    }

    fn record() -> StatementRecord {
        StatementRecord {
            card_last4: Some("9876".to_string()),
            statement_period: StatementPeriod {
                from: Some("09/01/2025".to_string()),
                to: None,
            },
            payment_due_date: None,
            total_due: Some("1234.56".to_string()),
            minimum_due: None,
            transactions: vec![
                txn("09/05/2025", "Amazon Purchase", "150.00", TransactionType::Debit),
                txn("09/07/2025", "Starbucks", "5.75", TransactionType::Debit),
                txn("09/10/2025", "Payment Received", "100.00", TransactionType::Credit),
                txn("09/11/2025", "Odd", "1.005", TransactionType::Debit),
            ],
        }
    }

    #[test]
    fn test_totals_in_minor_units() {
        let totals = Totals::of(&record());
        assert_eq!(totals.debits, 15575);
        assert_eq!(totals.credits, 10000);
        assert_eq!(totals.debit_count, 2);
        assert_eq!(totals.credit_count, 1);
        assert_eq!(totals.unsummed, 1);
    }

    #[test]
    fn test_text_summary_marks_absent_fields() {
        let text = render_text(&record(), "$");
        assert!(text.contains("Card (last 4)         9876"));
        assert!(text.contains("09/01/2025 to N/A"));
        assert!(text.contains("Payment due date      N/A"));
        assert!(text.contains("Total amount due      $1234.56"));
        assert!(text.contains("Minimum payment due   N/A"));
        assert!(text.contains("Total debits          $155.75"));
    }

    #[test]
    fn test_truncate_long_descriptions() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_summary_pdf_paginates() {
        let mut record = record();
        record.transactions = (0..80)
            .map(|i| txn("09/01/2025", &format!("Item {i}"), "1.00", TransactionType::Debit))
            .collect();
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let canvas = summary_canvas(&record, "$", date);
        assert!(canvas.page_count() >= 2);

        let bytes = canvas.to_bytes().unwrap();
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        let first = doc.extract_text(&[1]).unwrap();
        assert!(first.contains("Credit Card Statement Summary"));
        assert!(first.contains("N/A"));
        let second = doc.extract_text(&[2]).unwrap();
        assert!(second.contains("Description"));
    }

    #[test]
    fn test_write_summary_pdf_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.pdf");
        write_summary_pdf(&record(), "₹", &path).unwrap();
        let doc = lopdf::Document::load(&path).unwrap();
        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Rs.1234.56"));
    }
}
