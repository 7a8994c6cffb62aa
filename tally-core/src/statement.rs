//! The assembled statement record and its serialized shape.

use serde::{Deserialize, Serialize};

use crate::fields::FieldSet;
use crate::transaction::TransactionRecord;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementPeriod {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// One Field Set plus one Transaction Sequence.
///
/// Field order here is the serialized order of the JSON contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatementRecord {
    pub card_last4: Option<String>,
    pub statement_period: StatementPeriod,
    pub payment_due_date: Option<String>,
    pub total_due: Option<String>,
    pub minimum_due: Option<String>,
    pub transactions: Vec<TransactionRecord>,
}

impl StatementRecord {
    pub fn assemble(fields: FieldSet, transactions: Vec<TransactionRecord>) -> Self {
        Self {
            card_last4: fields.card_last4,
            statement_period: StatementPeriod {
                from: fields.statement_period_from,
                to: fields.statement_period_to,
            },
            payment_due_date: fields.payment_due_date,
            total_due: fields.total_due,
            minimum_due: fields.minimum_due,
            transactions,
        }
    }

    /// The flat six-key view of the summary fields.
    pub fn fields(&self) -> FieldSet {
        FieldSet {
            card_last4: self.card_last4.clone(),
            statement_period_from: self.statement_period.from.clone(),
            statement_period_to: self.statement_period.to.clone(),
            payment_due_date: self.payment_due_date.clone(),
            total_due: self.total_due.clone(),
            minimum_due: self.minimum_due.clone(),
        }
    }

    pub fn credits(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.transactions.iter().filter(|t| t.is_credit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKey;
    use crate::transaction::TransactionType;

    #[test]
    fn test_serialized_shape() {
        let mut fields = FieldSet::default();
        fields.set(FieldKey::CardLast4, "9876");
        fields.set(FieldKey::StatementPeriodFrom, "09/01/2025");
        fields.set(FieldKey::TotalDue, "1234.56");

        let record = StatementRecord::assemble(
            fields,
            vec![TransactionRecord {
                date: "09/10/2025".to_string(),
                description: "Payment Received - Thank You".to_string(),
                amount: "100.00".to_string(),
                kind: TransactionType::Credit,
            }],
        );

        let json = serde_json::to_value(&record).unwrap();
        let expected = serde_json::json!({
            "card_last4": "9876",
            "statement_period": {"from": "09/01/2025", "to": null},
            "payment_due_date": null,
            "total_due": "1234.56",
            "minimum_due": null,
            "transactions": [
                {"date": "09/10/2025", "description": "Payment Received - Thank You", "amount": "100.00", "type": "credit"}
            ]
        });
        assert_eq!(json, expected);
    }

    #[test]
    fn test_fields_round_trip() {
        let mut fields = FieldSet::default();
        fields.set(FieldKey::StatementPeriodTo, "09/30/2025");
        fields.set(FieldKey::MinimumDue, "50.00");
        let record = StatementRecord::assemble(fields.clone(), Vec::new());
        assert_eq!(record.fields(), fields);
    }
}
