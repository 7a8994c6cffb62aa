//! What `tally parse` prints after a run.

use tally_ingest::StatementReport;
use tally_report::render_text;

pub fn print_report(source: &str, report: &StatementReport, currency: &str) {
    println!("# {source}\n");
    print!("{}", render_text(&report.record, currency));

    match &report.table {
        Some(table) => println!("\nLedger: {table}"),
        None => println!("\nLedger: no transaction table found"),
    }

    if report.is_complete() {
        println!("All fields and transactions extracted.");
        return;
    }

    println!("\n{} issue(s):", report.diagnostics.len());
    for diagnostic in &report.diagnostics {
        println!("  - {diagnostic}");
    }
}
