//! Turns a detected table (a grid of cell strings) into transactions.
//!
//! The grid comes from geometric table detection and still contains whatever
//! sits above the column header. This module finds the header, maps header
//! labels to [`ColumnRole`]s and converts each remaining row.

use crate::outcome::{Diagnostic, Outcome, RowDropReason};
use crate::rules::{ColumnRole, RuleSet};
use crate::transaction::{
    TransactionRecord, TransactionType, is_well_formed_amount, strip_to_magnitude,
};

/// Column index holding each role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
}

/// Index of the first row whose joined text mentions a header needle.
pub fn find_header_row(grid: &[Vec<String>], rules: &RuleSet) -> Option<usize> {
    grid.iter().position(|row| rules.is_header_text(&row.join(" ")))
}

/// Maps header labels to roles; the first column matching a role wins.
///
/// On failure returns the roles no label satisfied.
pub fn map_columns(labels: &[String], rules: &RuleSet) -> Result<ColumnMap, Vec<ColumnRole>> {
    let mut date = None;
    let mut description = None;
    let mut amount = None;

    for (idx, label) in labels.iter().enumerate() {
        let slot = match rules.role_for(label) {
            Some(ColumnRole::Date) => &mut date,
            Some(ColumnRole::Description) => &mut description,
            Some(ColumnRole::Amount) => &mut amount,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(idx);
        }
    }

    match (date, description, amount) {
        (Some(date), Some(description), Some(amount)) => Ok(ColumnMap {
            date,
            description,
            amount,
        }),
        _ => {
            let mut missing = Vec::new();
            if date.is_none() {
                missing.push(ColumnRole::Date);
            }
            if description.is_none() {
                missing.push(ColumnRole::Description);
            }
            if amount.is_none() {
                missing.push(ColumnRole::Amount);
            }
            Err(missing)
        }
    }
}

/// Converts one data row, or says why it was dropped.
pub fn row_to_transaction(
    row: &[String],
    columns: &ColumnMap,
    rules: &RuleSet,
) -> Result<TransactionRecord, RowDropReason> {
    let cell = |idx: usize| {
        row.get(idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or(RowDropReason::IncompleteRow)
    };
    let date = cell(columns.date)?;
    let description = cell(columns.description)?;
    let amount_text = cell(columns.amount)?.replace(',', "");

    let kind = if rules.is_credit(&amount_text, description) {
        TransactionType::Credit
    } else {
        TransactionType::Debit
    };

    let amount = strip_to_magnitude(&amount_text);
    if amount.is_empty() {
        return Err(RowDropReason::NoAmount);
    }
    if !is_well_formed_amount(&amount) {
        return Err(RowDropReason::MalformedAmount);
    }

    Ok(TransactionRecord {
        date: date.to_string(),
        description: description.to_string(),
        amount,
        kind,
    })
}

/// Header search, column mapping and row conversion over a whole table.
///
/// Never fails: a table that cannot be mapped yields an empty sequence plus
/// diagnostics, and every dropped row is reported with its grid index.
pub fn transactions_from_table(
    grid: &[Vec<String>],
    rules: &RuleSet,
) -> Outcome<Vec<TransactionRecord>> {
    let mut diagnostics = Vec::new();

    let header_idx = match find_header_row(grid, rules) {
        Some(idx) => idx,
        None => {
            log::warn!("could not find transaction table header; using row 0");
            diagnostics.push(Diagnostic::HeaderRowNotFound);
            0
        }
    };

    let labels: Vec<String> = grid
        .get(header_idx)
        .map(|row| row.iter().map(|c| c.trim().to_string()).collect())
        .unwrap_or_default();

    let columns = match map_columns(&labels, rules) {
        Ok(columns) => columns,
        Err(missing) => {
            log::warn!("failed to map essential columns {missing:?}; found columns: {labels:?}");
            diagnostics.push(Diagnostic::MissingColumnRoles {
                missing,
                found: labels,
            });
            return Outcome::Partial(Vec::new(), diagnostics);
        }
    };

    let mut transactions = Vec::new();
    for (row_idx, row) in grid.iter().enumerate().skip(header_idx + 1) {
        match row_to_transaction(row, &columns, rules) {
            Ok(txn) => transactions.push(txn),
            Err(reason) => {
                log::debug!("row {row_idx} dropped: {reason}");
                diagnostics.push(Diagnostic::RowDropped {
                    row: row_idx,
                    reason,
                });
            }
        }
    }

    Outcome::from_parts(transactions, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn run(rows: &[&[&str]]) -> Outcome<Vec<TransactionRecord>> {
        transactions_from_table(&grid(rows), &RuleSet::default())
    }

    #[test]
    fn test_payment_with_cr_marker_is_credit() {
        let outcome = run(&[
            &["Date", "Transaction Details", "Amount"],
            &["09/10/2025", "Payment Received - Thank You", "$100.00 CR"],
        ]);
        assert!(outcome.is_complete());
        assert_eq!(
            outcome.value().unwrap(),
            &vec![TransactionRecord {
                date: "09/10/2025".to_string(),
                description: "Payment Received - Thank You".to_string(),
                amount: "100.00".to_string(),
                kind: TransactionType::Credit,
            }]
        );
    }

    #[test]
    fn test_plain_purchase_is_debit() {
        let outcome = run(&[
            &["Date", "Transaction Details", "Amount"],
            &["09/15/2025", "Gas Station", "$45.20"],
        ]);
        let txns = outcome.value().unwrap();
        assert_eq!(txns[0].amount, "45.20");
        assert_eq!(txns[0].kind, TransactionType::Debit);
    }

    #[test]
    fn test_missing_amount_column() {
        let outcome = run(&[
            &["Date", "Description", "Reference"],
            &["09/15/2025", "Gas Station", "REF123"],
        ]);
        assert!(outcome.value().unwrap().is_empty());
        assert_eq!(
            outcome.diagnostics(),
            &[Diagnostic::MissingColumnRoles {
                missing: vec![ColumnRole::Amount],
                found: vec![
                    "Date".to_string(),
                    "Description".to_string(),
                    "Reference".to_string()
                ],
            }]
        );
    }

    #[test]
    fn test_rows_above_header_are_discarded() {
        let outcome = run(&[
            &["Transaction History", "", ""],
            &["Date", "Description", "Amount"],
            &["09/05/2025", "Amazon Purchase", "$1,150.00"],
        ]);
        let txns = outcome.value().unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, "1150.00");
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_header_fallback_to_row_zero() {
        let outcome = run(&[
            &["Posted", "Payee", "Value"],
            &["09/05/2025", "Amazon", "$10.00"],
        ]);
        assert!(outcome.value().unwrap().is_empty());
        assert_eq!(outcome.diagnostics()[0], Diagnostic::HeaderRowNotFound);
        assert!(matches!(
            outcome.diagnostics()[1],
            Diagnostic::MissingColumnRoles { .. }
        ));
    }

    #[test]
    fn test_bad_rows_dropped_with_reason() {
        let outcome = run(&[
            &["Date", "Description", "Amount"],
            &["09/05/2025", "", "$10.00"],
            &["09/06/2025", "Fee reversal", "CR"],
            &["09/07/2025", "Odd", "1.2.3"],
            &["09/08/2025", "  Coffee  ", " 4.50 "],
        ]);
        let txns = outcome.value().unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Coffee");
        assert_eq!(txns[0].amount, "4.50");
        assert_eq!(
            outcome.diagnostics(),
            &[
                Diagnostic::RowDropped { row: 1, reason: RowDropReason::IncompleteRow },
                Diagnostic::RowDropped { row: 2, reason: RowDropReason::NoAmount },
                Diagnostic::RowDropped { row: 3, reason: RowDropReason::MalformedAmount },
            ]
        );
    }

    #[test]
    fn test_short_row_is_incomplete() {
        let outcome = run(&[&["Date", "Description", "Amount"], &["09/05/2025", "Amazon"]]);
        assert!(outcome.value().unwrap().is_empty());
        assert_eq!(
            outcome.diagnostics(),
            &[Diagnostic::RowDropped { row: 1, reason: RowDropReason::IncompleteRow }]
        );
    }

    #[test]
    fn test_first_column_per_role_wins() {
        let labels: Vec<String> = ["Txn Date", "Post Date", "Details", "Amount"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = map_columns(&labels, &RuleSet::default()).unwrap();
        assert_eq!(map, ColumnMap { date: 0, description: 2, amount: 3 });
    }

    #[test]
    fn test_emitted_records_are_well_formed() {
        let outcome = run(&[
            &["Date", "Description", "Amount"],
            &["09/05/2025", "Amazon", "$150.00"],
            &["09/07/2025", "Starbucks", "5.75"],
            &["09/09/2025", "Refund", "20 Cr"],
        ]);
        for txn in outcome.value().unwrap() {
            assert!(is_well_formed_amount(&txn.amount));
            assert!(!txn.date.trim().is_empty());
            assert!(!txn.description.trim().is_empty());
        }
        assert_eq!(outcome.value().unwrap()[2].kind, TransactionType::Credit);
    }
}
