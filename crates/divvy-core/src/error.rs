//! # Error Types
//!
//! Domain-specific error types for divvy-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  divvy-core errors (this file)                                         │
//! │  ├── CoreError        - Split and expense rule violations              │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  divvy-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → presentation layer      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (user id, observed totals, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each variant is a distinct kind the caller must handle deliberately

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::Money;
use crate::types::{SplitMethod, UserId};

// =============================================================================
// Core Error
// =============================================================================

/// Split Engine and expense planning errors.
///
/// Every variant is raised before any persistence side effect, so a failed
/// expense never leaves a partial split set behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Expense amount is zero, negative, non-numeric or finer than a cent.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Split method is not one of equal, exact, percentage.
    #[error("Unsupported split method: '{0}'")]
    UnsupportedSplitMethod(String),

    /// Fewer participants than the split method requires.
    #[error("{method} split requires at least {required} participant(s), got {actual}")]
    InsufficientParticipants {
        method: SplitMethod,
        required: usize,
        actual: usize,
    },

    /// The same participant appears twice in one split request.
    ///
    /// ## When This Occurs
    /// ```text
    /// participants: [alice, bob, alice]
    ///                             │
    ///                             ▼
    /// DuplicateParticipant("alice")  (one split per participant per expense)
    /// ```
    #[error("Participant listed more than once: {0}")]
    DuplicateParticipant(UserId),

    /// A referenced payer or participant does not exist.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Percentages do not sum to 100 within tolerance.
    #[error("Percentages must add up to 100, got {total}")]
    PercentageMismatch { total: Decimal },

    /// Exact split amounts do not sum to the expense amount.
    #[error("Split amounts add up to {actual}, expected {expected}")]
    AmountMismatch { expected: Money, actual: Money },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidAmount error with the given reason.
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Invalid format (e.g., malformed email, unparseable payload).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., an email that is already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
