//! tally-core: statement data model, text normalization, rule-driven field
//! extraction and ledger-table mapping.
//!
//! Nothing in this crate touches PDF files; it works on text and on grids of
//! cell strings produced by `tally-ingest`.

pub mod error;
pub mod field_extractor;
pub mod fields;
pub mod ledger;
pub mod normalize;
pub mod outcome;
pub mod rules;
pub mod statement;
pub mod transaction;

pub use error::StatementError;
pub use field_extractor::{FieldExtractor, extract_fields};
pub use fields::{FieldKey, FieldSet};
pub use ledger::{ColumnMap, transactions_from_table};
pub use normalize::normalize;
pub use outcome::{Diagnostic, Outcome, RowDropReason};
pub use rules::{ColumnRole, ColumnRule, CreditRules, FieldRule, RuleSet};
pub use statement::{StatementPeriod, StatementRecord};
pub use transaction::{
    TransactionRecord, TransactionType, format_minor_units, is_well_formed_amount,
    parse_minor_units,
};
