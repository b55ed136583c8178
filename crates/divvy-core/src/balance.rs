//! # Balance Aggregator
//!
//! Folds every recorded expense into per-user paid, owed and net totals.
//!
//! ## How Balances Are Computed
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Expense: Dinner 300.00, paid by A, equal split A/B/C                  │
//! │                                                                         │
//! │           total_paid   total_owed   net_balance                         │
//! │     A  ─►   300.00       100.00      +200.00   (owed to A)              │
//! │     B  ─►     0.00       100.00      -100.00   (B owes)                 │
//! │     C  ─►     0.00       100.00      -100.00   (C owes)                 │
//! │                                      ───────                            │
//! │                                         0.00   (closed ledger)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A payer who is also a participant accumulates both sides: the full amount
//! as paid and their own share as owed.
//!
//! Nothing is cached; every call recomputes from the source. Accumulation is
//! in integer cents, so the result does not depend on expense order.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ledger::LedgerSource;
use crate::money::Money;
use crate::types::{ExpenseId, LedgerEntry, SplitMethod, User, UserId};

// =============================================================================
// Balance Sheet
// =============================================================================

/// One user's aggregated position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BalanceEntry {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub total_paid: Money,
    pub total_owed: Money,
    /// `total_paid - total_owed`. Positive means others owe this user.
    pub net_balance: Money,
}

impl BalanceEntry {
    fn zeroed(user_id: UserId, name: String, email: String) -> Self {
        Self {
            user_id,
            name,
            email,
            total_paid: Money::zero(),
            total_owed: Money::zero(),
            net_balance: Money::zero(),
        }
    }
}

/// Every known user's balance, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BalanceSheet {
    entries: BTreeMap<UserId, BalanceEntry>,
}

impl BalanceSheet {
    /// Builds the sheet from users and ledger entries.
    ///
    /// Ids referenced by expenses but absent from `users` still get a row
    /// (with empty name and email) so the sheet always balances.
    pub fn from_ledger(users: &[User], entries: &[LedgerEntry]) -> Self {
        let mut sheet: BTreeMap<UserId, BalanceEntry> = users
            .iter()
            .map(|u| {
                (
                    u.id.clone(),
                    BalanceEntry::zeroed(u.id.clone(), u.name.clone(), u.email.clone()),
                )
            })
            .collect();

        for entry in entries {
            row(&mut sheet, &entry.expense.payer_id).total_paid += entry.expense.amount();
            for split in &entry.splits {
                row(&mut sheet, &split.user_id).total_owed += split.amount();
            }
        }

        for balance in sheet.values_mut() {
            balance.net_balance = balance.total_paid - balance.total_owed;
        }

        Self { entries: sheet }
    }

    pub fn get(&self, user_id: &str) -> Option<&BalanceEntry> {
        self.entries.get(user_id)
    }

    /// Balances in user-id order.
    pub fn entries(&self) -> impl Iterator<Item = &BalanceEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every net balance. Zero whenever every split is backed by a
    /// recorded payment.
    pub fn total_net(&self) -> Money {
        self.entries.values().map(|b| b.net_balance).sum()
    }
}

fn row<'a>(sheet: &'a mut BTreeMap<UserId, BalanceEntry>, id: &str) -> &'a mut BalanceEntry {
    sheet
        .entry(id.to_string())
        .or_insert_with(|| BalanceEntry::zeroed(id.to_string(), String::new(), String::new()))
}

/// Computes the balance sheet for everyone in the source.
pub fn generate_balance_sheet<S>(source: &S) -> Result<BalanceSheet, S::Error>
where
    S: LedgerSource + ?Sized,
{
    let users = source.list_users()?;
    let entries = source.list_expenses()?;
    Ok(BalanceSheet::from_ledger(&users, &entries))
}

// =============================================================================
// User Statement
// =============================================================================

/// One expense as seen by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatementLine {
    pub expense_id: ExpenseId,
    pub description: String,
    pub split_method: SplitMethod,
    /// Full expense amount.
    pub amount: Money,
    pub paid_by_user: bool,
    /// The user's own split; zero when they only paid.
    pub owed_share: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A user's expenses and the totals over just those expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserStatement {
    pub user: User,
    pub lines: Vec<StatementLine>,
    pub total_paid: Money,
    pub total_owed: Money,
    pub net_balance: Money,
}

impl UserStatement {
    /// Builds the statement from any set of entries; unrelated ones are
    /// skipped. Lines are ordered by creation time.
    pub fn for_user(user: User, entries: &[LedgerEntry]) -> Self {
        let mut lines: Vec<StatementLine> = entries
            .iter()
            .filter(|entry| entry.involves(&user.id))
            .map(|entry| StatementLine {
                expense_id: entry.expense.id.clone(),
                description: entry.expense.description.clone(),
                split_method: entry.expense.split_method,
                amount: entry.expense.amount(),
                paid_by_user: entry.expense.payer_id == user.id,
                owed_share: entry
                    .split_for(&user.id)
                    .map(|s| s.amount())
                    .unwrap_or_default(),
                created_at: entry.expense.created_at,
            })
            .collect();
        lines.sort_by_key(|line| line.created_at);

        let total_paid: Money = lines
            .iter()
            .filter(|line| line.paid_by_user)
            .map(|line| line.amount)
            .sum();
        let total_owed: Money = lines.iter().map(|line| line.owed_share).sum();

        Self {
            user,
            lines,
            total_paid,
            total_owed,
            net_balance: total_paid - total_owed,
        }
    }
}

/// Computes one user's statement, or `None` if the user does not exist.
pub fn generate_user_statement<S>(
    source: &S,
    user_id: &str,
) -> Result<Option<UserStatement>, S::Error>
where
    S: LedgerSource + ?Sized,
{
    let Some(user) = source.get_user(user_id)? else {
        return Ok(None);
    };
    let entries = source.list_expenses_for_user(user_id)?;
    Ok(Some(UserStatement::for_user(user, &entries)))
}

// =============================================================================
// Unit Tests
// =============================================================================
