//! # divvy-core: Pure Splitting and Balance Logic for Divvy
//!
//! This crate is the **heart** of Divvy. It turns shared expenses into
//! per-user obligations and nets them into balances, as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Divvy Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (out of scope)                     │   │
//! │  │     HTTP handlers, CLIs, exports  ──►  ExpensePayload (JSON)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ divvy-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  request  │  │   split   │  │  balance  │  │  ledger   │  │   │
//! │  │   │  Payload  │─►│  Engine   │  │ Aggregator│◄─│  traits   │  │   │
//! │  │   │ NewExpense│  │ ExpensePlan│ │ Statement │  │MemoryLedger│ │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO LOGGING • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    divvy-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Expense, ExpenseSplit, LedgerEntry)
//! - [`money`] - Money type with integer cent arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Field and total validation rules
//! - [`request`] - Typed split requests and the wire payload boundary
//! - [`split`] - Split Engine
//! - [`ledger`] - Collaborator traits and the in-memory ledger
//! - [`balance`] - Balance Aggregator and per-user statements
//!
//! ## Example Usage
//!
//! ```rust
//! use divvy_core::{generate_balance_sheet, MemoryLedger, Money, NewExpense, NewUser, SplitRequest};
//!
//! let mut ledger = MemoryLedger::new();
//! let mut add = |name: &str| {
//!     ledger
//!         .add_user(NewUser {
//!             name: name.into(),
//!             email: format!("{}@example.com", name.to_lowercase()),
//!             mobile: "5551234567".into(),
//!         })
//!         .unwrap()
//!         .id
//! };
//! let (a, b, c) = (add("A"), add("B"), add("C"));
//!
//! ledger
//!     .record_expense(&NewExpense {
//!         payer_id: a.clone(),
//!         amount: Money::from_cents(30000),
//!         description: "Dinner".into(),
//!         split: SplitRequest::Equal { participants: vec![a.clone(), b, c] },
//!     })
//!     .unwrap();
//!
//! let sheet = generate_balance_sheet(&ledger).unwrap();
//! assert_eq!(sheet.get(&a).unwrap().net_balance, Money::from_cents(20000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod error;
pub mod ledger;
pub mod money;
pub mod request;
pub mod split;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use divvy_core::Money` instead of
// `use divvy_core::money::Money`

pub use balance::{
    generate_balance_sheet, generate_user_statement, BalanceEntry, BalanceSheet, StatementLine,
    UserStatement,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{LedgerSource, MemoryLedger, UserLookup};
pub use money::Money;
pub use request::{ExactShare, ExpensePayload, NewExpense, PayloadSplit, PercentageShare, SplitRequest};
pub use split::{compute_splits, plan_expense, ComputedSplit, ExpensePlan};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a user's display name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of an email address.
pub const MAX_EMAIL_LEN: usize = 254;

/// Maximum length of an expense description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Largest accepted expense amount, in cents (10,000,000,000.00).
///
/// Keeps every split sum and ledger-wide total well inside `i64`.
pub const MAX_EXPENSE_CENTS: i64 = 1_000_000_000_000;

/// How far percentages may drift from 100 and still be accepted (0.01,
/// exclusive).
pub const PERCENTAGE_TOLERANCE: rust_decimal::Decimal =
    rust_decimal::Decimal::from_parts(1, 0, 0, false, 2);
