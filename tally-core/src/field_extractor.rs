//! Summary field extraction from normalized statement text.

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

use crate::error::StatementError;
use crate::fields::FieldSet;
use crate::outcome::{Diagnostic, Outcome};
use crate::rules::{FieldRule, RuleSet};

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: FieldRule,
    regex: Regex,
}

/// Applies an ordered list of [`FieldRule`]s to statement text.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    rules: Vec<CompiledRule>,
}

impl FieldExtractor {
    /// Compiles every rule case-insensitively with `.` matching newlines.
    pub fn new(rules: &[FieldRule]) -> Result<Self, StatementError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let regex = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .dot_matches_new_line(true)
                .build()
                .map_err(|source| StatementError::InvalidPattern {
                    rule: rule.name.clone(),
                    source,
                })?;

            let available = regex.captures_len() - 1;
            if rule.captures.len() > available {
                return Err(StatementError::CaptureMismatch {
                    rule: rule.name.clone(),
                    wanted: rule.captures.len(),
                    available,
                });
            }

            compiled.push(CompiledRule {
                rule: rule.clone(),
                regex,
            });
        }
        Ok(Self { rules: compiled })
    }

    pub fn from_rule_set(rules: &RuleSet) -> Result<Self, StatementError> {
        Self::new(&rules.fields)
    }

    /// Never fails: keys no rule could fill stay absent and are reported as
    /// [`Diagnostic::FieldNotFound`].
    pub fn extract(&self, text: &str) -> Outcome<FieldSet> {
        let mut fields = FieldSet::default();

        for CompiledRule { rule, regex } in &self.rules {
            if rule.captures.iter().all(|k| fields.is_present(*k)) {
                continue;
            }
            // First occurrence in document order.
            let Some(caps) = regex.captures(text) else {
                log::debug!("field rule '{}' did not match", rule.name);
                continue;
            };

            for (i, key) in rule.captures.iter().enumerate() {
                if fields.is_present(*key) {
                    continue;
                }
                let Some(m) = caps.get(i + 1) else {
                    continue;
                };
                let mut value = m.as_str().trim().to_string();
                if rule.strip_grouping {
                    value.retain(|c| c != ',');
                }
                if !value.is_empty() {
                    log::debug!("field {key} = {value:?} (rule '{}')", rule.name);
                    fields.set(*key, value);
                }
            }
        }

        let diagnostics = fields
            .missing()
            .into_iter()
            .map(|field| Diagnostic::FieldNotFound { field })
            .collect();
        Outcome::from_parts(fields, diagnostics)
    }
}

fn default_extractor() -> &'static FieldExtractor {
    static EXTRACTOR: OnceLock<FieldExtractor> = OnceLock::new();
    EXTRACTOR.get_or_init(|| {
        FieldExtractor::from_rule_set(&RuleSet::default()).expect("default field rules compile")
    })
}

/// Extracts the six summary fields with the built-in rules.
pub fn extract_fields(text: &str) -> Outcome<FieldSet> {
    default_extractor().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKey;
    use crate::normalize::normalize;

    const STATEMENT: &str = "Global Trust Bank
STATEMENT OF ACCOUNT
Account Number: **** **** **** 9876
Statement Period: 09/01/2025 - 09/30/2025
Payment Due Date: 10/20/2025
Total Amount Due: $1,234.56
Minimum Payment Due: $50.00
";

    fn fields_of(text: &str) -> FieldSet {
        extract_fields(text).value().cloned().unwrap()
    }

    #[test]
    fn test_payment_due_date() {
        let f = fields_of("Payment Due Date 10/20/2025");
        assert_eq!(f.payment_due_date.as_deref(), Some("10/20/2025"));

        let f = fields_of("PAYMENT DUE DATE 10/20/2025");
        assert_eq!(f.payment_due_date.as_deref(), Some("10/20/2025"));
    }

    #[test]
    fn test_total_due_strips_glyph_and_commas() {
        let f = fields_of("Total Amount Due ₹1,234.56");
        assert_eq!(f.total_due.as_deref(), Some("1234.56"));

        let f = fields_of("New Balance $12,001.10");
        assert_eq!(f.total_due.as_deref(), Some("12001.10"));
    }

    #[test]
    fn test_full_statement() {
        let outcome = extract_fields(&normalize(STATEMENT));
        assert!(outcome.is_complete(), "{:?}", outcome.diagnostics());
        let f = outcome.value().unwrap();
        assert_eq!(f.card_last4.as_deref(), Some("9876"));
        assert_eq!(f.statement_period_from.as_deref(), Some("09/01/2025"));
        assert_eq!(f.statement_period_to.as_deref(), Some("09/30/2025"));
        assert_eq!(f.payment_due_date.as_deref(), Some("10/20/2025"));
        assert_eq!(f.total_due.as_deref(), Some("1234.56"));
        assert_eq!(f.minimum_due.as_deref(), Some("50.00"));
    }

    #[test]
    fn test_label_and_value_across_line_break() {
        let f = fields_of("Statement Period\n09/01/2025 to\n09/30/2025");
        assert_eq!(f.statement_period_from.as_deref(), Some("09/01/2025"));
        assert_eq!(f.statement_period_to.as_deref(), Some("09/30/2025"));
    }

    #[test]
    fn test_first_match_wins() {
        let f = fields_of("Payment Due Date 10/20/2025\nPayment Due Date 11/20/2025");
        assert_eq!(f.payment_due_date.as_deref(), Some("10/20/2025"));
    }

    #[test]
    fn test_card_number_unmasked_takes_last_four() {
        let f = fields_of("Card Number 1234 5678 9012 3456\nName");
        assert_eq!(f.card_last4.as_deref(), Some("3456"));
    }

    #[test]
    fn test_card_number_with_words_before_digits() {
        let f = fields_of("Card Number ending in 1234\nName");
        assert_eq!(f.card_last4.as_deref(), Some("1234"));
        let f = fields_of("Account Number (last four) XXXX-XXXX-XXXX-5521");
        assert_eq!(f.card_last4.as_deref(), Some("5521"));
    }

    #[test]
    fn test_card_number_does_not_cross_lines() {
        let f = fields_of("Account Number\nPage 1 of 2");
        assert_eq!(f.card_last4, None);
    }

    #[test]
    fn test_empty_text_has_every_key_absent() {
        let outcome = extract_fields("");
        let f = outcome.value().unwrap();
        assert_eq!(f.missing().len(), 6);
        assert_eq!(outcome.diagnostics().len(), 6);
        assert!(outcome
            .diagnostics()
            .contains(&Diagnostic::FieldNotFound { field: FieldKey::TotalDue }));
    }

    #[test]
    fn test_one_missing_field_does_not_block_others() {
        let text = STATEMENT.replace("Minimum Payment Due: $50.00", "");
        let outcome = extract_fields(&normalize(&text));
        assert_eq!(
            outcome.diagnostics(),
            &[Diagnostic::FieldNotFound { field: FieldKey::MinimumDue }]
        );
        assert_eq!(outcome.value().unwrap().total_due.as_deref(), Some("1234.56"));
    }

    #[test]
    fn test_later_rule_fills_key_left_absent() {
        let mut rules = RuleSet::default().fields;
        rules.push(FieldRule::new(
            "minimum_due_short_label",
            r"min(?:imum)?\.?\s+due\s*:?\s*[₹$]?\s*([\d,]+\.\d{2})",
            &[FieldKey::MinimumDue],
            true,
        ));
        let extractor = FieldExtractor::new(&rules).unwrap();
        let outcome = extractor.extract("Min. Due: $1,050.00");
        assert_eq!(
            outcome.value().unwrap().minimum_due.as_deref(),
            Some("1050.00")
        );
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let bad = FieldRule::new("broken", r"(unclosed", &[FieldKey::TotalDue], false);
        assert!(matches!(
            FieldExtractor::new(&[bad]),
            Err(StatementError::InvalidPattern { .. })
        ));

        let greedy = FieldRule::new(
            "too_many",
            r"due (\d+)",
            &[FieldKey::TotalDue, FieldKey::MinimumDue],
            false,
        );
        assert!(matches!(
            FieldExtractor::new(&[greedy]),
            Err(StatementError::CaptureMismatch { wanted: 2, available: 1, .. })
        ));
    }
}
