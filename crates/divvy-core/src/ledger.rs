//! # Ledger Collaborators
//!
//! The interfaces the Split Engine and Balance Aggregator read through, plus
//! an in-memory ledger that implements them.
//!
//! ## Seams
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   split::compute_splits ──► UserLookup    (does this id exist?)        │
//! │                                                                         │
//! │   balance::generate_*   ──► LedgerSource  (users + ledger entries)     │
//! │                                                                         │
//! │   Implementations:                                                      │
//! │   ├── HashSet<UserId>, HashMap<UserId, User>, [User]                   │
//! │   ├── MemoryLedger  (this module; tests, seeding, snapshots)           │
//! │   └── divvy-db      (loads a MemoryLedger snapshot from SQLite)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::request::NewExpense;
use crate::split::{plan_expense, ExpensePlan};
use crate::types::{LedgerEntry, NewUser, User, UserId};
use crate::validation::validate_new_user;

// =============================================================================
// User Lookup
// =============================================================================

/// Answers whether a user id exists.
pub trait UserLookup {
    fn contains_user(&self, id: &str) -> bool;
}

impl UserLookup for HashSet<UserId> {
    fn contains_user(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl UserLookup for HashMap<UserId, User> {
    fn contains_user(&self, id: &str) -> bool {
        self.contains_key(id)
    }
}

impl UserLookup for [User] {
    fn contains_user(&self, id: &str) -> bool {
        self.iter().any(|u| u.id == id)
    }
}

impl UserLookup for Vec<User> {
    fn contains_user(&self, id: &str) -> bool {
        self.as_slice().contains_user(id)
    }
}

// =============================================================================
// Ledger Source
// =============================================================================

/// Read access to users and recorded expenses.
///
/// `Error` is whatever the backing store fails with; aggregation passes it
/// through untouched.
pub trait LedgerSource {
    type Error;

    fn list_users(&self) -> Result<Vec<User>, Self::Error>;

    fn get_user(&self, id: &str) -> Result<Option<User>, Self::Error>;

    fn list_expenses(&self) -> Result<Vec<LedgerEntry>, Self::Error>;

    /// Expenses the user paid for or participates in.
    fn list_expenses_for_user(&self, id: &str) -> Result<Vec<LedgerEntry>, Self::Error> {
        Ok(self
            .list_expenses()?
            .into_iter()
            .filter(|entry| entry.involves(id))
            .collect())
    }
}

// =============================================================================
// Memory Ledger
// =============================================================================

/// An in-memory ledger of users and expenses.
///
/// Entries are kept in creation order. Saving an expense pushes the expense
/// and all of its splits as one value, so a reader never sees half of it.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    users: Vec<User>,
    entries: Vec<LedgerEntry>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from already persisted data.
    pub fn from_parts(users: Vec<User>, entries: Vec<LedgerEntry>) -> Self {
        Self { users, entries }
    }

    /// Registers a user after validating its fields.
    ///
    /// Emails are unique (compared after normalization).
    pub fn add_user(&mut self, new: NewUser) -> CoreResult<User> {
        let clean = validate_new_user(&new)?;

        if self.users.iter().any(|u| u.email == clean.email) {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: clean.email,
            }
            .into());
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: clean.name,
            email: clean.email,
            mobile: clean.mobile,
        };
        self.users.push(user.clone());
        Ok(user)
    }

    /// Plans and saves an expense. Nothing is stored if planning fails.
    pub fn record_expense(&mut self, new: &NewExpense) -> CoreResult<LedgerEntry> {
        let plan = plan_expense(new, &*self)?;
        Ok(self.save_expense(plan))
    }

    /// Stores a validated plan under a fresh id.
    pub fn save_expense(&mut self, plan: ExpensePlan) -> LedgerEntry {
        let entry = plan.into_ledger_entry(Uuid::new_v4().to_string(), Utc::now());
        self.entries.push(entry.clone());
        entry
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

impl UserLookup for MemoryLedger {
    fn contains_user(&self, id: &str) -> bool {
        self.users.contains_user(id)
    }
}

impl LedgerSource for MemoryLedger {
    type Error = Infallible;

    fn list_users(&self) -> Result<Vec<User>, Self::Error> {
        Ok(self.users.clone())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>, Self::Error> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    fn list_expenses(&self) -> Result<Vec<LedgerEntry>, Self::Error> {
        Ok(self.entries.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
