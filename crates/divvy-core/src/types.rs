//! # Domain Types
//!
//! Core domain types used throughout Divvy.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Expense     │   │  ExpenseSplit   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  payer_id       │   │  expense_id(FK) │       │
//! │  │  name           │   │  amount_cents   │◄──│  user_id (FK)   │       │
//! │  │  email          │   │  split_method   │   │  amount_cents   │       │
//! │  │  mobile         │   │  description    │   │  percentage?    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  LedgerEntry = Expense + its splits (created and read as one unit)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

/// User identifier (UUID v4 string).
pub type UserId = String;

/// Expense identifier (UUID v4 string).
pub type ExpenseId = String;

// =============================================================================
// User
// =============================================================================

/// A person who pays for or shares expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Unique across users.
    pub email: String,
    pub mobile: String,
}

/// Fields needed to register a user. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile: String,
}

// =============================================================================
// Split Method
// =============================================================================

/// How an expense amount is divided among participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Amount divided evenly across participants.
    Equal,
    /// Caller supplies each participant's amount.
    Exact,
    /// Caller supplies each participant's percentage.
    Percentage,
}

impl SplitMethod {
    /// All recognized methods, in wire order.
    pub const ALL: [SplitMethod; 3] = [SplitMethod::Equal, SplitMethod::Exact, SplitMethod::Percentage];

    /// Wire name of the method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SplitMethod::Equal => "equal",
            SplitMethod::Exact => "exact",
            SplitMethod::Percentage => "percentage",
        }
    }

    /// Fewest participants a split of this method may have.
    ///
    /// An equal split with a single participant is a plain personal expense;
    /// exact and percentage splits only make sense between two or more people.
    pub const fn min_participants(&self) -> usize {
        match self {
            SplitMethod::Equal => 1,
            SplitMethod::Exact | SplitMethod::Percentage => 2,
        }
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        SplitMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == name)
            .ok_or_else(|| CoreError::UnsupportedSplitMethod(s.to_string()))
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A recorded shared expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Expense {
    pub id: ExpenseId,
    /// Total paid, in cents. Always positive.
    pub amount_cents: i64,
    pub description: String,
    pub split_method: SplitMethod,
    pub payer_id: UserId,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Expense Split
// =============================================================================

/// One participant's owed share of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseSplit {
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    /// Owed amount in cents.
    pub amount_cents: i64,
    /// Only set for percentage splits.
    #[ts(as = "Option<String>")]
    pub percentage: Option<Decimal>,
}

impl ExpenseSplit {
    /// Returns the owed amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Ledger Entry
// =============================================================================

/// An expense together with the splits it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LedgerEntry {
    pub expense: Expense,
    pub splits: Vec<ExpenseSplit>,
}

impl LedgerEntry {
    /// True when the user paid for or shares this expense.
    pub fn involves(&self, user_id: &str) -> bool {
        self.expense.payer_id == user_id || self.splits.iter().any(|s| s.user_id == user_id)
    }

    /// The user's split, if they are a participant.
    pub fn split_for(&self, user_id: &str) -> Option<&ExpenseSplit> {
        self.splits.iter().find(|s| s.user_id == user_id)
    }

    /// Sum of all split amounts.
    pub fn splits_total(&self) -> Money {
        self.splits.iter().map(ExpenseSplit::amount).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
