//! # Expense Requests
//!
//! Typed split requests and the boundary that produces them from loosely
//! shaped wire payloads.
//!
//! ## From Wire to Split Engine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ExpensePayload (JSON)                                                  │
//! │  { payer_id, amount: 300, split_method: "percentage",                  │
//! │    splits: [{ user_id, percentage: 50 }, ...] }                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  into_new_expense() ← method name, decimal amount, required fields     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  NewExpense { payer_id, amount: Money, description,                    │
//! │               split: SplitRequest::Percentage { percentages } }        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  split::plan_expense()                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{SplitMethod, UserId};
use crate::validation::validate_expense_amount;

// =============================================================================
// Typed Requests
// =============================================================================

/// One participant's explicit amount in an exact split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExactShare {
    pub user_id: UserId,
    pub amount_cents: i64,
}

/// One participant's percentage in a percentage split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PercentageShare {
    pub user_id: UserId,
    #[ts(as = "String")]
    pub percentage: Decimal,
}

/// Method-specific split parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "split_method", rename_all = "lowercase")]
pub enum SplitRequest {
    Equal { participants: Vec<UserId> },
    Exact { amounts: Vec<ExactShare> },
    Percentage { percentages: Vec<PercentageShare> },
}

impl SplitRequest {
    /// The split method this request uses.
    pub fn method(&self) -> SplitMethod {
        match self {
            SplitRequest::Equal { .. } => SplitMethod::Equal,
            SplitRequest::Exact { .. } => SplitMethod::Exact,
            SplitRequest::Percentage { .. } => SplitMethod::Percentage,
        }
    }

    /// Participant ids in request order.
    pub fn participant_ids(&self) -> Vec<&str> {
        match self {
            SplitRequest::Equal { participants } => {
                participants.iter().map(String::as_str).collect()
            }
            SplitRequest::Exact { amounts } => amounts.iter().map(|s| s.user_id.as_str()).collect(),
            SplitRequest::Percentage { percentages } => {
                percentages.iter().map(|s| s.user_id.as_str()).collect()
            }
        }
    }
}

/// A fully typed request to record an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewExpense {
    pub payer_id: UserId,
    pub amount: Money,
    pub description: String,
    pub split: SplitRequest,
}

// =============================================================================
// Wire Payload
// =============================================================================

/// One entry of the payload's `splits` list. Which value is required depends
/// on the split method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadSplit {
    pub user_id: UserId,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub percentage: Option<Decimal>,
}

/// Loosely typed expense payload as clients send it.
///
/// Amounts are decimals in major units (`300`, `"12.50"`); the split method
/// is a free-form string checked by [`ExpensePayload::into_new_expense`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePayload {
    pub payer_id: UserId,
    pub amount: Decimal,
    pub description: String,
    pub split_method: String,
    #[serde(default)]
    pub participants: Option<Vec<UserId>>,
    #[serde(default)]
    pub splits: Option<Vec<PayloadSplit>>,
}

impl ExpensePayload {
    /// Parses a JSON payload.
    ///
    /// Malformed JSON, missing fields and non-numeric amounts all surface as
    /// `Validation(InvalidFormat)`.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ValidationError::InvalidFormat {
                field: "payload".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Validates the payload shape and converts it into a typed request.
    ///
    /// ## Checks (in order)
    /// 1. `split_method` is a recognized method → `UnsupportedSplitMethod`
    /// 2. `amount` is positive with at most two decimals → `InvalidAmount`
    /// 3. The method's participant list is present → `InsufficientParticipants`
    /// 4. Each split carries its method's value → `Validation(Required)`
    pub fn into_new_expense(self) -> CoreResult<NewExpense> {
        let method: SplitMethod = self.split_method.parse()?;

        let amount = Money::from_decimal(self.amount).ok_or_else(|| {
            CoreError::invalid_amount(format!(
                "{} is not a whole number of cents",
                self.amount
            ))
        })?;
        validate_expense_amount(amount)?;

        let missing_list = || CoreError::InsufficientParticipants {
            method,
            required: method.min_participants(),
            actual: 0,
        };

        let split = match method {
            SplitMethod::Equal => SplitRequest::Equal {
                participants: self.participants.ok_or_else(missing_list)?,
            },
            SplitMethod::Exact => {
                let splits = self.splits.ok_or_else(missing_list)?;
                let amounts = splits
                    .into_iter()
                    .enumerate()
                    .map(|(i, split)| -> CoreResult<ExactShare> {
                        let value = split.amount.ok_or_else(|| required(i, "amount"))?;
                        let share = Money::from_decimal(value).ok_or_else(|| {
                            CoreError::invalid_amount(format!(
                                "split amount {value} for {} is not a whole number of cents",
                                split.user_id
                            ))
                        })?;
                        Ok(ExactShare {
                            user_id: split.user_id,
                            amount_cents: share.cents(),
                        })
                    })
                    .collect::<CoreResult<Vec<_>>>()?;
                SplitRequest::Exact { amounts }
            }
            SplitMethod::Percentage => {
                let splits = self.splits.ok_or_else(missing_list)?;
                let percentages = splits
                    .into_iter()
                    .enumerate()
                    .map(|(i, split)| -> CoreResult<PercentageShare> {
                        let percentage =
                            split.percentage.ok_or_else(|| required(i, "percentage"))?;
                        Ok(PercentageShare {
                            user_id: split.user_id,
                            percentage,
                        })
                    })
                    .collect::<CoreResult<Vec<_>>>()?;
                SplitRequest::Percentage { percentages }
            }
        };

        Ok(NewExpense {
            payer_id: self.payer_id,
            amount,
            description: self.description,
            split,
        })
    }
}

fn required(index: usize, value: &str) -> CoreError {
    ValidationError::Required {
        field: format!("splits[{index}].{value}"),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equal_payload() {
        let payload = ExpensePayload::from_json(
            r#"{
                "payer_id": "alice",
                "amount": 300,
                "description": "Dinner",
                "split_method": "equal",
                "participants": ["alice", "bob", "charlie"]
            }"#,
        )
        .unwrap();

        let expense = payload.into_new_expense().unwrap();
        assert_eq!(expense.amount, Money::from_cents(30000));
        assert_eq!(expense.split.method(), SplitMethod::Equal);
        assert_eq!(expense.split.participant_ids(), vec!["alice", "bob", "charlie"]);
    }

    #[test]
    fn test_exact_payload_converts_amounts_to_cents() {
        let payload = ExpensePayload::from_json(
            r#"{
                "payer_id": "alice",
                "amount": "100.50",
                "description": "Shopping",
                "split_method": "exact",
                "splits": [
                    {"user_id": "alice", "amount": "50.25"},
                    {"user_id": "bob", "amount": 50.25}
                ]
            }"#,
        )
        .unwrap();

        let expense = payload.into_new_expense().unwrap();
        assert_eq!(expense.amount, Money::from_cents(10050));
        assert_eq!(
            expense.split,
            SplitRequest::Exact {
                amounts: vec![
                    ExactShare {
                        user_id: "alice".to_string(),
                        amount_cents: 5025
                    },
                    ExactShare {
                        user_id: "bob".to_string(),
                        amount_cents: 5025
                    },
                ]
            }
        );
    }

    #[test]
    fn test_percentage_payload() {
        let payload = ExpensePayload::from_json(
            r#"{
                "payer_id": "alice",
                "amount": 1000,
                "description": "Party",
                "split_method": "percentage",
                "splits": [
                    {"user_id": "alice", "percentage": 50},
                    {"user_id": "bob", "percentage": "30"},
                    {"user_id": "charlie", "percentage": 20}
                ]
            }"#,
        )
        .unwrap();

        match payload.into_new_expense().unwrap().split {
            SplitRequest::Percentage { percentages } => {
                let values: Vec<Decimal> = percentages.iter().map(|p| p.percentage).collect();
                assert_eq!(values, vec![dec!(50), dec!(30), dec!(20)]);
            }
            other => panic!("expected percentage split, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_method() {
        let payload = ExpensePayload {
            payer_id: "alice".to_string(),
            amount: dec!(10),
            description: "Taxi".to_string(),
            split_method: "shares".to_string(),
            participants: Some(vec!["alice".to_string()]),
            splits: None,
        };

        assert!(matches!(
            payload.into_new_expense(),
            Err(CoreError::UnsupportedSplitMethod(m)) if m == "shares"
        ));
    }

    #[test]
    fn test_invalid_amounts() {
        for amount in [dec!(0), dec!(-5), dec!(10.001)] {
            let payload = ExpensePayload {
                payer_id: "alice".to_string(),
                amount,
                description: "Taxi".to_string(),
                split_method: "equal".to_string(),
                participants: Some(vec!["alice".to_string()]),
                splits: None,
            };
            assert!(
                matches!(payload.into_new_expense(), Err(CoreError::InvalidAmount { .. })),
                "amount {amount} should be rejected"
            );
        }
    }

    #[test]
    fn test_non_numeric_amount_is_rejected_at_parse() {
        let result = ExpensePayload::from_json(
            r#"{"payer_id": "a", "amount": "lots", "description": "x", "split_method": "equal"}"#,
        );
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[test]
    fn test_missing_participant_list() {
        let payload = ExpensePayload {
            payer_id: "alice".to_string(),
            amount: dec!(10),
            description: "Taxi".to_string(),
            split_method: "exact".to_string(),
            participants: None,
            splits: None,
        };
        assert!(matches!(
            payload.into_new_expense(),
            Err(CoreError::InsufficientParticipants { actual: 0, .. })
        ));
    }

    #[test]
    fn test_split_missing_value() {
        let payload = ExpensePayload {
            payer_id: "alice".to_string(),
            amount: dec!(10),
            description: "Taxi".to_string(),
            split_method: "percentage".to_string(),
            participants: None,
            splits: Some(vec![
                PayloadSplit {
                    user_id: "alice".to_string(),
                    amount: None,
                    percentage: Some(dec!(50)),
                },
                PayloadSplit {
                    user_id: "bob".to_string(),
                    amount: Some(dec!(5)),
                    percentage: None,
                },
            ]),
        };

        match payload.into_new_expense() {
            Err(CoreError::Validation(ValidationError::Required { field })) => {
                assert_eq!(field, "splits[1].percentage")
            }
            other => panic!("expected Required, got {other:?}"),
        }
    }

    #[test]
    fn test_split_request_serde_is_tagged() {
        let request = SplitRequest::Equal {
            participants: vec!["alice".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["split_method"], "equal");
        assert_eq!(json["participants"][0], "alice");
    }
}
