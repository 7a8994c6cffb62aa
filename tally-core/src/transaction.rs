//! Transaction ledger types.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Credit => f.write_str("credit"),
            TransactionType::Debit => f.write_str("debit"),
        }
    }
}

/// One ledger line taken from the statement's transaction table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Source format preserved (e.g. `09/10/2025`).
    pub date: String,
    pub description: String,
    /// Non-negative decimal string, no grouping separators or currency glyph.
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl TransactionRecord {
    pub fn is_credit(&self) -> bool {
        self.kind == TransactionType::Credit
    }

    /// Amount in hundredths, if it has at most two decimals.
    pub fn amount_minor_units(&self) -> Option<i64> {
        parse_minor_units(&self.amount)
    }
}

/// Keeps only ASCII digits and decimal points.
pub fn strip_to_magnitude(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// True when `amount` has the shape `^\d+(\.\d+)?$`.
pub fn is_well_formed_amount(amount: &str) -> bool {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match amount.split_once('.') {
        Some((whole, frac)) => all_digits(whole) && all_digits(frac),
        None => all_digits(amount),
    }
}

/// Parses a well-formed amount into hundredths (`"45.2"` → `4520`).
///
/// Returns `None` for malformed input or more than two decimals.
pub fn parse_minor_units(amount: &str) -> Option<i64> {
    if !is_well_formed_amount(amount) {
        return None;
    }
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if frac.len() > 2 {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let mut cents: i64 = if frac.is_empty() { 0 } else { frac.parse().ok()? };
    if frac.len() == 1 {
        cents *= 10;
    }
    whole.checked_mul(100)?.checked_add(cents)
}

/// Renders hundredths back into a decimal string (`4520` → `"45.20"`).
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
