//! Machine-readable exports of a parsed statement.

use std::fs;
use std::io::Write;
use std::path::Path;
use tally_core::StatementRecord;

use crate::error::ReportError;

/// Pretty-printed JSON in the record's serialized shape.
pub fn to_json_string(record: &StatementRecord) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(record)?)
}

pub fn save_json(record: &StatementRecord, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let json = to_json_string(record)?;
    fs::write(path, json)?;
    log::debug!("wrote JSON to {}", path.display());
    Ok(())
}

/// Writes the ledger as `date,description,amount,type` rows.
pub fn write_csv<W: Write>(record: &StatementRecord, out: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(out);
    if record.transactions.is_empty() {
        wtr.write_record(["date", "description", "amount", "type"])?;
    }
    for txn in &record.transactions {
        wtr.serialize(txn)?;
    }
    wtr.flush()?;
    Ok(())
}
