//! A fake credit-card statement PDF for demos and pipeline tests.

use std::path::Path;

use crate::canvas::{Canvas, Font, MARGIN};
use crate::error::ReportError;

/// `(date, description, amount)` rows of the sample ledger.
pub const SAMPLE_TRANSACTIONS: [(&str, &str, &str); 6] = [
    ("09/05/2025", "Amazon Purchase", "$150.00"),
    ("09/07/2025", "Starbucks", "$5.75"),
    ("09/10/2025", "Payment Received - Thank You", "$100.00 CR"),
    ("09/15/2025", "Gas Station", "$45.20"),
    ("09/22/2025", "Grocery Store", "$112.30"),
    ("09/28/2025", "Restaurant", "$85.00"),
];

const TABLE_COLUMNS: [i64; 3] = [MARGIN, MARGIN + 100, MARGIN + 400];
const ROW_STEP: i64 = 20;

/// Bank header, account summary block, and a three-column transaction table.
pub fn sample_canvas() -> Canvas {
    let mut canvas = Canvas::new();

    canvas.text(Font::Bold, 18, MARGIN, 740, "Global Trust Bank");
    canvas.text(Font::Bold, 12, MARGIN, 716, "STATEMENT OF ACCOUNT");

    canvas.text(Font::Regular, 10, MARGIN, 690, "Account Number: **** **** **** 9876");
    canvas.text(
        Font::Regular,
        10,
        300,
        690,
        "Statement Period: 09/01/2025 - 09/30/2025",
    );
    canvas.text(Font::Regular, 10, MARGIN, 670, "Payment Due Date: 10/20/2025");
    canvas.text(Font::Regular, 10, MARGIN, 650, "Total Amount Due: $1,234.56");
    canvas.text(Font::Regular, 10, MARGIN, 630, "Minimum Payment Due: $50.00");

    canvas.text(Font::Bold, 12, MARGIN, 590, "Transaction History");

    let mut y = 565;
    for (x, label) in TABLE_COLUMNS.iter().zip(["Date", "Transaction Details", "Amount"]) {
        canvas.text(Font::Bold, 10, *x, y, label);
    }
    for (date, description, amount) in SAMPLE_TRANSACTIONS {
        y -= ROW_STEP;
        for (x, cell) in TABLE_COLUMNS.iter().zip([date, description, amount]) {
            canvas.text(Font::Regular, 10, *x, y, cell);
        }
    }

    canvas.text(
        Font::Regular,
        8,
        MARGIN,
        60,
        "Thank you for banking with Global Trust Bank.",
    );
    canvas
}

pub fn sample_statement() -> Result<Vec<u8>, ReportError> {
    sample_canvas().to_bytes()
}

pub fn write_sample_statement(path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    sample_canvas().save(path)?;
    log::info!("wrote sample statement to {}", path.display());
    Ok(())
}
