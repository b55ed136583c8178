//! # divvy-db: Database Layer for Divvy
//!
//! This crate persists the Divvy ledger in SQLite and wires the pure
//! `divvy-core` rules to storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Divvy Data Flow                                  │
//! │                                                                         │
//! │  Caller (seed binary, presentation layer)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     divvy-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ ExpenseRepo   │    │              │  │   │
//! │  │   │ DbConfig      │    │ LedgerRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ plan_expense, BalanceSheet    │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │                         divvy-core (pure rules)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool configuration and environment profiles
//! - [`pool`] - Connection pool creation and repository access
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (user, expense, ledger)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use divvy_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let alice = db.users().create(&new_user).await?;
//! db.expenses().create(&new_expense).await?;
//!
//! let sheet = db.ledger().balance_sheet().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig, Environment};
pub use error::{DbError, DbResult};
pub use pool::Database;

// Repository re-exports for convenience
pub use repository::expense::ExpenseRepository;
pub use repository::ledger::LedgerRepository;
pub use repository::user::UserRepository;
