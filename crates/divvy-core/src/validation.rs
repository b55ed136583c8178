//! # Validation Module
//!
//! Input validation utilities for Divvy.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request boundary (request.rs)                                │
//! │  ├── Payload shape, split method name, decimal amounts                 │
//! │  └── Loose wire payload → typed NewExpense                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Business rules (THIS MODULE + split.rs)                      │
//! │  ├── Field rules (names, emails, descriptions)                         │
//! │  └── Amount and percentage totals                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE(email), UNIQUE(expense_id, user_id)                        │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::NewUser;
use crate::{
    MAX_DESCRIPTION_LEN, MAX_EMAIL_LEN, MAX_EXPENSE_CENTS, MAX_NAME_LEN, PERCENTAGE_TOLERANCE,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// User Validators
// =============================================================================

/// Validates a user's display name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
pub fn validate_user_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an email address shape.
///
/// ## Rules
/// - Exactly one `@` with a non-empty local part
/// - Domain contains a dot and neither starts nor ends with one
/// - No whitespace, at most 254 characters
///
/// ## Example
/// ```rust
/// use divvy_core::validation::validate_email;
///
/// assert!(validate_email("alice@example.com").is_ok());
/// assert!(validate_email("alice@localhost").is_err());
/// assert!(validate_email("not an email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("missing '@'"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must look like name@domain.tld"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must look like domain.tld"));
    }

    Ok(())
}

/// Validates a mobile number.
///
/// ## Rules
/// - Optional leading `+`
/// - Then 7 to 15 ASCII digits, nothing else
pub fn validate_mobile(mobile: &str) -> ValidationResult<()> {
    let mobile = mobile.trim();

    if mobile.is_empty() {
        return Err(ValidationError::Required {
            field: "mobile".to_string(),
        });
    }

    let digits = mobile.strip_prefix('+').unwrap_or(mobile);
    if !digits.chars().all(|c| c.is_ascii_digit()) || !(7..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "mobile".to_string(),
            reason: "must be 7 to 15 digits, optionally prefixed with '+'".to_string(),
        });
    }

    Ok(())
}

/// Validates a user registration and returns it with fields trimmed.
pub fn validate_new_user(user: &NewUser) -> ValidationResult<NewUser> {
    validate_user_name(&user.name)?;
    validate_email(&user.email)?;
    validate_mobile(&user.mobile)?;

    Ok(NewUser {
        name: user.name.trim().to_string(),
        email: user.email.trim().to_lowercase(),
        mobile: user.mobile.trim().to_string(),
    })
}

// =============================================================================
// Expense Validators
// =============================================================================

/// Validates an expense description.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 200 characters
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(())
}

/// Validates an expense amount.
///
/// ## Rules
/// - Must be strictly positive
/// - Must not exceed [`MAX_EXPENSE_CENTS`]
pub fn validate_expense_amount(amount: Money) -> CoreResult<()> {
    if !amount.is_positive() {
        return Err(CoreError::invalid_amount(format!(
            "amount must be greater than zero, got {amount}"
        )));
    }

    let max = Money::from_cents(MAX_EXPENSE_CENTS);
    if amount > max {
        return Err(CoreError::invalid_amount(format!(
            "amount must be at most {max}, got {amount}"
        )));
    }

    Ok(())
}

/// Validates that percentages add up to 100.
///
/// ## Rules
/// - `|total - 100|` must be strictly below 0.01
///
/// ```text
/// 99.991 ──► accepted     100.009 ──► accepted
/// 99.98  ──► rejected     100.02  ──► rejected (PercentageMismatch)
/// ```
pub fn validate_percentage_total(total: Decimal) -> CoreResult<()> {
    if (total - Decimal::ONE_HUNDRED).abs() >= PERCENTAGE_TOLERANCE {
        return Err(CoreError::PercentageMismatch { total });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
