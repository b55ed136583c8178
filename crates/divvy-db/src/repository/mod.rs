//! # Repository Module
//!
//! Database repository implementations for Divvy.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.expenses().create(&new_expense)                            │
//! │       ▼                                                                 │
//! │  ExpenseRepository                                                     │
//! │  ├── resolve referenced users   (UserRepository::find_existing)        │
//! │  ├── plan with the Split Engine (divvy_core::plan_expense)             │
//! │  └── save_plan in one transaction                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LedgerRepository → divvy_core::BalanceSheet / UserStatement           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - User registration and lookup
//! - [`ExpenseRepository`](expense::ExpenseRepository) - Atomic expense creation and listing
//! - [`LedgerRepository`](ledger::LedgerRepository) - Balance sheets and statements

pub mod expense;
pub mod ledger;
pub mod user;
