//! The six scalar summary fields of a statement.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of one summary field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    CardLast4,
    StatementPeriodFrom,
    StatementPeriodTo,
    PaymentDueDate,
    TotalDue,
    MinimumDue,
}

impl FieldKey {
    /// Every key, in serialization order.
    pub const ALL: [FieldKey; 6] = [
        FieldKey::CardLast4,
        FieldKey::StatementPeriodFrom,
        FieldKey::StatementPeriodTo,
        FieldKey::PaymentDueDate,
        FieldKey::TotalDue,
        FieldKey::MinimumDue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::CardLast4 => "card_last4",
            FieldKey::StatementPeriodFrom => "statement_period_from",
            FieldKey::StatementPeriodTo => "statement_period_to",
            FieldKey::PaymentDueDate => "payment_due_date",
            FieldKey::TotalDue => "total_due",
            FieldKey::MinimumDue => "minimum_due",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary fields recovered from statement text.
///
/// Every key always exists; `None` is the absent marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSet {
    pub card_last4: Option<String>,
    pub statement_period_from: Option<String>,
    pub statement_period_to: Option<String>,
    pub payment_due_date: Option<String>,
    pub total_due: Option<String>,
    pub minimum_due: Option<String>,
}

impl FieldSet {
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.slot(key).as_deref()
    }

    /// Stores `value` under `key`, replacing what was there.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        *self.slot_mut(key) = Some(value.into());
    }

    pub fn is_present(&self, key: FieldKey) -> bool {
        self.slot(key).is_some()
    }

    /// Keys still holding the absent marker.
    pub fn missing(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .into_iter()
            .filter(|k| !self.is_present(*k))
            .collect()
    }

    /// All six entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, Option<&str>)> + '_ {
        FieldKey::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    fn slot(&self, key: FieldKey) -> &Option<String> {
        match key {
            FieldKey::CardLast4 => &self.card_last4,
            FieldKey::StatementPeriodFrom => &self.statement_period_from,
            FieldKey::StatementPeriodTo => &self.statement_period_to,
            FieldKey::PaymentDueDate => &self.payment_due_date,
            FieldKey::TotalDue => &self.total_due,
            FieldKey::MinimumDue => &self.minimum_due,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<String> {
        match key {
            FieldKey::CardLast4 => &mut self.card_last4,
            FieldKey::StatementPeriodFrom => &mut self.statement_period_from,
            FieldKey::StatementPeriodTo => &mut self.statement_period_to,
            FieldKey::PaymentDueDate => &mut self.payment_due_date,
            FieldKey::TotalDue => &mut self.total_due,
            FieldKey::MinimumDue => &mut self.minimum_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_all_keys_absent() {
        let fields = FieldSet::default();
        assert_eq!(fields.missing(), FieldKey::ALL.to_vec());
        assert_eq!(fields.iter().count(), 6);
    }

    #[test]
    fn test_serializes_exactly_six_keys() {
        let mut fields = FieldSet::default();
        fields.set(FieldKey::TotalDue, "1234.56");

        let json = serde_json::to_value(&fields).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 6);
        for key in FieldKey::ALL {
            assert!(obj.contains_key(key.as_str()), "missing {key}");
        }
        assert_eq!(obj["total_due"], "1234.56");
        assert!(obj["card_last4"].is_null());
    }

    #[test]
    fn test_key_serde_name_matches_as_str() {
        for key in FieldKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }
}
