//! Data-driven extraction rules.
//!
//! Statement layouts vary between issuers, so the patterns that find summary
//! fields, the labels that identify ledger columns and the markers that flag
//! credits all live in a [`RuleSet`] that can be loaded from TOML. Adding a
//! layout variant means adding a rule, not touching the extractors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fields::FieldKey;

/// Semantic role of a ledger column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Description,
    Amount,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Date, ColumnRole::Description, ColumnRole::Amount];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Description => "description",
            ColumnRole::Amount => "amount",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pattern and the field keys its capture groups fill (group 1 → first
/// key, group 2 → second key, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    pub pattern: String,
    pub captures: Vec<FieldKey>,
    /// Remove `,` grouping separators from captured values.
    #[serde(default)]
    pub strip_grouping: bool,
}

impl FieldRule {
    pub fn new(name: &str, pattern: &str, captures: &[FieldKey], strip_grouping: bool) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            captures: captures.to_vec(),
            strip_grouping,
        }
    }
}

/// Header label substrings that identify a column role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnRule {
    pub role: ColumnRole,
    pub needles: Vec<String>,
}

/// Markers that turn a ledger row into a credit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CreditRules {
    /// Looked for (case-insensitive) in the amount cell.
    pub amount_markers: Vec<String>,
    /// Looked for (case-insensitive) in the description cell.
    pub description_keywords: Vec<String>,
}

impl Default for CreditRules {
    fn default() -> Self {
        Self {
            amount_markers: vec!["cr".to_string()],
            description_keywords: vec!["payment".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuleSet {
    /// A row whose joined text contains any of these is the table header.
    pub header_needles: Vec<String>,
    pub credit: CreditRules,
    /// Tried in order; the first rule that matches fills its keys.
    pub fields: Vec<FieldRule>,
    /// Tried in order for each header label; the first match assigns the role.
    pub columns: Vec<ColumnRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            header_needles: vec!["date".to_string(), "description".to_string()],
            credit: CreditRules::default(),
            fields: default_field_rules(),
            columns: default_column_rules(),
        }
    }
}

impl RuleSet {
    /// Role of a header label, by case-insensitive substring match.
    pub fn role_for(&self, label: &str) -> Option<ColumnRole> {
        let label = label.to_lowercase();
        self.columns
            .iter()
            .find(|rule| rule.needles.iter().any(|n| label.contains(&n.to_lowercase())))
            .map(|rule| rule.role)
    }

    pub fn is_header_text(&self, joined_row: &str) -> bool {
        let text = joined_row.to_lowercase();
        self.header_needles
            .iter()
            .any(|n| text.contains(&n.to_lowercase()))
    }

    pub fn is_credit(&self, amount_text: &str, description: &str) -> bool {
        let amount = amount_text.to_lowercase();
        let desc = description.to_lowercase();
        self.credit
            .amount_markers
            .iter()
            .any(|m| amount.contains(&m.to_lowercase()))
            || self
                .credit
                .description_keywords
                .iter()
                .any(|k| desc.contains(&k.to_lowercase()))
    }
}

// A date-like token: digits and slashes, 8 to 10 characters.
const DATE_TOKEN: &str = r"([\d/]{8,10})";
// A grouped decimal with an optional currency glyph in front.
const MONEY_TOKEN: &str = r"[₹$€£]?\s*([\d,]+\.\d{2})";

pub fn default_field_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(
            "card_last4",
            r"(?:card|account)\s+number[^\n\d]*[0-9Xx*•\- \t]*(\d{4})\b",
            &[FieldKey::CardLast4],
            false,
        ),
        FieldRule::new(
            "statement_period",
            &format!(r"statement\s+period\s*:?\s*{DATE_TOKEN}\s*(?:to|-)\s*{DATE_TOKEN}"),
            &[FieldKey::StatementPeriodFrom, FieldKey::StatementPeriodTo],
            false,
        ),
        FieldRule::new(
            "payment_due_date",
            &format!(r"payment\s+due\s+date\s*:?\s*{DATE_TOKEN}"),
            &[FieldKey::PaymentDueDate],
            false,
        ),
        FieldRule::new(
            "total_due",
            &format!(r"(?:total\s+amount\s+due|new\s+balance)\s*:?\s*{MONEY_TOKEN}"),
            &[FieldKey::TotalDue],
            true,
        ),
        FieldRule::new(
            "minimum_due",
            &format!(r"minimum\s+payment\s+due\s*:?\s*{MONEY_TOKEN}"),
            &[FieldKey::MinimumDue],
            true,
        ),
    ]
}

pub fn default_column_rules() -> Vec<ColumnRule> {
    let rule = |role, needles: &[&str]| ColumnRule {
        role,
        needles: needles.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        rule(ColumnRole::Date, &["date"]),
        rule(ColumnRole::Description, &["description", "details"]),
        rule(ColumnRole::Amount, &["amount"]),
    ]
}
