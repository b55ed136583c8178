//! # Split Engine
//!
//! Turns one expense amount plus a split request into per-participant owed
//! shares.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          compute_splits()                               │
//! │                                                                         │
//! │  1. amount > 0                        ──► InvalidAmount                │
//! │  2. participants ≥ method minimum     ──► InsufficientParticipants     │
//! │  3. no participant listed twice       ──► DuplicateParticipant         │
//! │  4. every participant exists          ──► UserNotFound                 │
//! │  5. method-specific values                                              │
//! │     ├── exact:      Σ amounts == amount   ──► AmountMismatch           │
//! │     └── percentage: |Σ pct − 100| < 0.01  ──► PercentageMismatch       │
//! │                                                                         │
//! │  Output: Vec<ComputedSplit> in request order, Σ shares == amount       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Remainder Policy
//! ```text
//! equal       100.00 / 3        → [33.34, 33.33, 33.33]  leftover to first
//! percentage  10.00 × [1/3 ×3]  → [3.34, 3.33, 3.33]     largest remainder
//! ```
//!
//! The engine is pure: it never touches a store. Persisting the result is the
//! caller's job.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::UserLookup;
use crate::money::Money;
use crate::request::{ExactShare, NewExpense, PercentageShare, SplitRequest};
use crate::types::{Expense, ExpenseId, ExpenseSplit, LedgerEntry, SplitMethod, UserId};
use crate::validation::{validate_description, validate_expense_amount, validate_percentage_total};

// =============================================================================
// Computed Split
// =============================================================================

/// One participant's share as produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputedSplit {
    pub user_id: UserId,
    pub amount: Money,
    /// Only set for percentage splits.
    #[ts(as = "Option<String>")]
    pub percentage: Option<Decimal>,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the owed shares for an expense.
///
/// Percentage shares are `amount × pct / Σpct`, not `amount × pct / 100`.
/// The two agree when the percentages total exactly 100. Inside the
/// tolerance band they differ by a fraction of a cent, and dividing by the
/// actual total keeps the shares summing to `amount`.
///
/// ## Example
/// ```rust
/// use std::collections::HashSet;
/// use divvy_core::money::Money;
/// use divvy_core::request::SplitRequest;
/// use divvy_core::split::compute_splits;
///
/// let users: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
/// let request = SplitRequest::Equal {
///     participants: vec!["a".into(), "b".into(), "c".into()],
/// };
///
/// let splits = compute_splits(Money::from_cents(10000), &request, &users).unwrap();
/// let cents: Vec<i64> = splits.iter().map(|s| s.amount.cents()).collect();
/// assert_eq!(cents, vec![3334, 3333, 3333]);
/// ```
pub fn compute_splits<L>(
    amount: Money,
    request: &SplitRequest,
    users: &L,
) -> CoreResult<Vec<ComputedSplit>>
where
    L: UserLookup + ?Sized,
{
    validate_expense_amount(amount)?;
    check_participants(request, users)?;

    match request {
        SplitRequest::Equal { participants } => Ok(split_equal(amount, participants)),
        SplitRequest::Exact { amounts } => split_exact(amount, amounts),
        SplitRequest::Percentage { percentages } => split_percentage(amount, percentages),
    }
}

/// Count, uniqueness and existence checks shared by every method.
fn check_participants<L>(request: &SplitRequest, users: &L) -> CoreResult<()>
where
    L: UserLookup + ?Sized,
{
    let method = request.method();
    let ids = request.participant_ids();

    if ids.len() < method.min_participants() {
        return Err(CoreError::InsufficientParticipants {
            method,
            required: method.min_participants(),
            actual: ids.len(),
        });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(**id)) {
        return Err(CoreError::DuplicateParticipant(dup.to_string()));
    }

    if let Some(missing) = ids.iter().find(|id| !users.contains_user(id)) {
        return Err(CoreError::UserNotFound(missing.to_string()));
    }

    Ok(())
}

fn split_equal(amount: Money, participants: &[UserId]) -> Vec<ComputedSplit> {
    participants
        .iter()
        .zip(amount.split_evenly(participants.len()))
        .map(|(user_id, share)| ComputedSplit {
            user_id: user_id.clone(),
            amount: share,
            percentage: None,
        })
        .collect()
}

fn split_exact(amount: Money, amounts: &[ExactShare]) -> CoreResult<Vec<ComputedSplit>> {
    if let Some(bad) = amounts
        .iter()
        .find(|s| s.amount_cents < 0 || s.amount_cents > amount.cents())
    {
        return Err(ValidationError::OutOfRange {
            field: format!("amount for {}", bad.user_id),
            min: "0".to_string(),
            max: amount.to_string(),
        }
        .into());
    }

    let total = amounts
        .iter()
        .try_fold(Money::zero(), |acc, s| acc.checked_add(Money::from_cents(s.amount_cents)))
        .ok_or_else(|| CoreError::invalid_amount("split amounts overflow"))?;
    if total != amount {
        return Err(CoreError::AmountMismatch {
            expected: amount,
            actual: total,
        });
    }

    Ok(amounts
        .iter()
        .map(|s| ComputedSplit {
            user_id: s.user_id.clone(),
            amount: Money::from_cents(s.amount_cents),
            percentage: None,
        })
        .collect())
}

fn split_percentage(
    amount: Money,
    percentages: &[PercentageShare],
) -> CoreResult<Vec<ComputedSplit>> {
    if let Some(bad) = percentages
        .iter()
        .find(|s| s.percentage.is_sign_negative() || s.percentage > Decimal::ONE_HUNDRED)
    {
        return Err(ValidationError::OutOfRange {
            field: format!("percentage for {}", bad.user_id),
            min: "0".to_string(),
            max: "100".to_string(),
        }
        .into());
    }

    let total: Decimal = percentages.iter().map(|s| s.percentage).sum();
    validate_percentage_total(total)?;

    let weights: Vec<Decimal> = percentages.iter().map(|s| s.percentage).collect();
    let shares = amount
        .allocate(&weights)
        .ok_or_else(|| CoreError::invalid_amount(format!("cannot allocate {amount} by percentage")))?;

    Ok(percentages
        .iter()
        .zip(shares)
        .map(|(s, share)| ComputedSplit {
            user_id: s.user_id.clone(),
            amount: share,
            percentage: Some(s.percentage),
        })
        .collect())
}

// =============================================================================
// Expense Plan
// =============================================================================

/// A validated expense ready to be persisted.
///
/// Holding an `ExpensePlan` means every rule has passed; a store only has
/// to assign the id and timestamp and write it atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpensePlan {
    pub payer_id: UserId,
    pub amount: Money,
    pub description: String,
    pub split_method: SplitMethod,
    pub splits: Vec<ComputedSplit>,
}

impl ExpensePlan {
    /// Stamps the plan with its identity.
    pub fn into_ledger_entry(self, id: ExpenseId, created_at: DateTime<Utc>) -> LedgerEntry {
        let splits = self
            .splits
            .into_iter()
            .map(|s| ExpenseSplit {
                expense_id: id.clone(),
                user_id: s.user_id,
                amount_cents: s.amount.cents(),
                percentage: s.percentage,
            })
            .collect();

        LedgerEntry {
            expense: Expense {
                id,
                amount_cents: self.amount.cents(),
                description: self.description,
                split_method: self.split_method,
                payer_id: self.payer_id,
                created_at,
            },
            splits,
        }
    }
}

/// Validates a whole expense and computes its splits.
///
/// Checks the description and the payer before handing off to
/// [`compute_splits`].
pub fn plan_expense<L>(new: &NewExpense, users: &L) -> CoreResult<ExpensePlan>
where
    L: UserLookup + ?Sized,
{
    validate_expense_amount(new.amount)?;
    validate_description(&new.description)?;

    if !users.contains_user(&new.payer_id) {
        return Err(CoreError::UserNotFound(new.payer_id.clone()));
    }

    let splits = compute_splits(new.amount, &new.split, users)?;

    Ok(ExpensePlan {
        payer_id: new.payer_id.clone(),
        amount: new.amount,
        description: new.description.trim().to_string(),
        split_method: new.split.method(),
        splits,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ExpensePayload;
    use crate::MAX_EXPENSE_CENTS;
    use rust_decimal_macros::dec;

    fn users() -> HashSet<UserId> {
        ["alice", "bob", "charlie"].iter().map(|s| s.to_string()).collect()
    }

    fn ids(names: &[&str]) -> Vec<UserId> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn cents(splits: &[ComputedSplit]) -> Vec<i64> {
        splits.iter().map(|s| s.amount.cents()).collect()
    }

    fn pct(entries: &[(&str, Decimal)]) -> SplitRequest {
        SplitRequest::Percentage {
            percentages: entries
                .iter()
                .map(|(id, p)| PercentageShare {
                    user_id: id.to_string(),
                    percentage: *p,
                })
                .collect(),
        }
    }

    fn exact(entries: &[(&str, i64)]) -> SplitRequest {
        SplitRequest::Exact {
            amounts: entries
                .iter()
                .map(|(id, c)| ExactShare {
                    user_id: id.to_string(),
                    amount_cents: *c,
                })
                .collect(),
        }
    }

    #[test]
    fn test_equal_split_even() {
        let request = SplitRequest::Equal {
            participants: ids(&["alice", "bob", "charlie"]),
        };
        let splits = compute_splits(Money::from_cents(30000), &request, &users()).unwrap();

        assert_eq!(cents(&splits), vec![10000, 10000, 10000]);
        assert_eq!(splits[0].user_id, "alice");
        assert!(splits.iter().all(|s| s.percentage.is_none()));
    }

    #[test]
    fn test_equal_split_leftover_goes_to_first() {
        let request = SplitRequest::Equal {
            participants: ids(&["charlie", "alice", "bob"]),
        };
        let splits = compute_splits(Money::from_cents(101), &request, &users()).unwrap();

        assert_eq!(cents(&splits), vec![34, 34, 33]);
        assert_eq!(splits[0].user_id, "charlie");
        assert_eq!(splits.iter().map(|s| s.amount).sum::<Money>(), Money::from_cents(101));
    }

    #[test]
    fn test_equal_split_single_participant() {
        let request = SplitRequest::Equal {
            participants: ids(&["bob"]),
        };
        let splits = compute_splits(Money::from_cents(999), &request, &users()).unwrap();
        assert_eq!(cents(&splits), vec![999]);
    }

    #[test]
    fn test_exact_split() {
        let request = exact(&[("alice", 5000), ("bob", 2500), ("charlie", 2500)]);
        let splits = compute_splits(Money::from_cents(10000), &request, &users()).unwrap();
        assert_eq!(cents(&splits), vec![5000, 2500, 2500]);
    }

    #[test]
    fn test_exact_split_zero_share_allowed() {
        let request = exact(&[("alice", 10000), ("bob", 0)]);
        assert!(compute_splits(Money::from_cents(10000), &request, &users()).is_ok());
    }

    #[test]
    fn test_exact_split_mismatch() {
        let request = exact(&[("alice", 5000), ("bob", 4000)]);
        match compute_splits(Money::from_cents(10000), &request, &users()) {
            Err(CoreError::AmountMismatch { expected, actual }) => {
                assert_eq!(expected.cents(), 10000);
                assert_eq!(actual.cents(), 9000);
            }
            other => panic!("expected AmountMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_split_negative_share() {
        let request = exact(&[("alice", 11000), ("bob", -1000)]);
        assert!(matches!(
            compute_splits(Money::from_cents(10000), &request, &users()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_exact_share_above_amount() {
        let request = exact(&[("alice", 10001), ("bob", -1)]);
        assert!(matches!(
            compute_splits(Money::from_cents(10000), &request, &users()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_exact_shares_that_would_wrap_are_rejected() {
        let payload = ExpensePayload::from_json(
            r#"{
                "payer_id": "alice",
                "amount": "0.01",
                "description": "Coffee",
                "split_method": "exact",
                "splits": [
                    {"user_id": "alice", "amount": "92233720368547758.07"},
                    {"user_id": "bob", "amount": "92233720368547758.07"},
                    {"user_id": "charlie", "amount": "0.03"}
                ]
            }"#,
        )
        .unwrap();
        let new = payload.into_new_expense().unwrap();

        assert!(matches!(
            plan_expense(&new, &users()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_percentage_split() {
        let request = pct(&[("alice", dec!(50)), ("bob", dec!(30)), ("charlie", dec!(20))]);
        let splits = compute_splits(Money::from_cents(100000), &request, &users()).unwrap();

        assert_eq!(cents(&splits), vec![50000, 30000, 20000]);
        assert_eq!(splits[1].percentage, Some(dec!(30)));
    }

    #[test]
    fn test_percentage_split_rounding_sums_exactly() {
        let third = dec!(33.333);
        let request = pct(&[("alice", third), ("bob", third), ("charlie", dec!(33.334))]);
        let splits = compute_splits(Money::from_cents(1000), &request, &users()).unwrap();

        assert_eq!(splits.iter().map(|s| s.amount).sum::<Money>(), Money::from_cents(1000));
        assert_eq!(cents(&splits), vec![333, 333, 334]);
    }

    #[test]
    fn test_percentage_split_within_tolerance() {
        let request = pct(&[("alice", dec!(50)), ("bob", dec!(50.009))]);
        let splits = compute_splits(Money::from_cents(10000), &request, &users()).unwrap();
        assert_eq!(splits.iter().map(|s| s.amount).sum::<Money>(), Money::from_cents(10000));
    }

    #[test]
    fn test_percentage_split_mismatch() {
        let request = pct(&[("alice", dec!(50)), ("bob", dec!(30)), ("charlie", dec!(30))]);
        match compute_splits(Money::from_cents(100000), &request, &users()) {
            Err(CoreError::PercentageMismatch { total }) => assert_eq!(total, dec!(110)),
            other => panic!("expected PercentageMismatch, got {other:?}"),
        }

        let request = pct(&[("alice", dec!(50)), ("bob", dec!(50.02))]);
        assert!(matches!(
            compute_splits(Money::from_cents(100000), &request, &users()),
            Err(CoreError::PercentageMismatch { .. })
        ));
    }

    #[test]
    fn test_percentage_out_of_range() {
        let request = pct(&[("alice", dec!(150)), ("bob", dec!(-50))]);
        assert!(matches!(
            compute_splits(Money::from_cents(10000), &request, &users()),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_invalid_amount() {
        let request = SplitRequest::Equal {
            participants: ids(&["alice"]),
        };
        assert!(matches!(
            compute_splits(Money::zero(), &request, &users()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            compute_splits(Money::from_cents(MAX_EXPENSE_CENTS + 1), &request, &users()),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_insufficient_participants() {
        let request = SplitRequest::Equal { participants: vec![] };
        assert!(matches!(
            compute_splits(Money::from_cents(100), &request, &users()),
            Err(CoreError::InsufficientParticipants { required: 1, actual: 0, .. })
        ));

        let request = exact(&[("alice", 100)]);
        assert!(matches!(
            compute_splits(Money::from_cents(100), &request, &users()),
            Err(CoreError::InsufficientParticipants {
                method: SplitMethod::Exact,
                required: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_duplicate_participant() {
        let request = SplitRequest::Equal {
            participants: ids(&["alice", "bob", "alice"]),
        };
        assert!(matches!(
            compute_splits(Money::from_cents(300), &request, &users()),
            Err(CoreError::DuplicateParticipant(id)) if id == "alice"
        ));
    }

    #[test]
    fn test_first_missing_user_is_reported() {
        let request = SplitRequest::Equal {
            participants: ids(&["alice", "ghost", "phantom"]),
        };
        assert!(matches!(
            compute_splits(Money::from_cents(300), &request, &users()),
            Err(CoreError::UserNotFound(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_plan_expense() {
        let new = NewExpense {
            payer_id: "alice".to_string(),
            amount: Money::from_cents(30000),
            description: "  Dinner ".to_string(),
            split: SplitRequest::Equal {
                participants: ids(&["alice", "bob", "charlie"]),
            },
        };

        let plan = plan_expense(&new, &users()).unwrap();
        assert_eq!(plan.description, "Dinner");
        assert_eq!(plan.split_method, SplitMethod::Equal);
        assert_eq!(plan.splits.len(), 3);

        let entry = plan.into_ledger_entry("e1".to_string(), Utc::now());
        assert_eq!(entry.expense.amount_cents, 30000);
        assert!(entry.splits.iter().all(|s| s.expense_id == "e1"));
        assert_eq!(entry.splits_total(), entry.expense.amount());
    }

    #[test]
    fn test_plan_expense_unknown_payer() {
        let new = NewExpense {
            payer_id: "ghost".to_string(),
            amount: Money::from_cents(100),
            description: "Taxi".to_string(),
            split: SplitRequest::Equal {
                participants: ids(&["alice"]),
            },
        };
        assert!(matches!(
            plan_expense(&new, &users()),
            Err(CoreError::UserNotFound(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_plan_expense_requires_description() {
        let new = NewExpense {
            payer_id: "alice".to_string(),
            amount: Money::from_cents(100),
            description: "   ".to_string(),
            split: SplitRequest::Equal {
                participants: ids(&["alice"]),
            },
        };
        assert!(matches!(
            plan_expense(&new, &users()),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));
    }
}
