//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Splitting naively:                                                     │
//! │    10.00 / 3 = 3.33 (×3 = 9.99)  → Lost 0.01!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + explicit allocation                      │
//! │    1000 cents / 3 = 334 + 333 + 333 = 1000 cents                        │
//! │    Every leftover cent is handed to someone, never dropped              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use divvy_core::money::Money;
//!
//! let dinner = Money::from_cents(1000); // 10.00
//! let shares = dinner.split_evenly(3);
//! assert_eq!(shares, vec![
//!     Money::from_cents(334),
//!     Money::from_cents(333),
//!     Money::from_cents(333),
//! ]);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: net balances go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as cents**: presentation layers format for display
///
/// ## Where Money is Used
/// ```text
/// Expense.amount ──► Split Engine ──► ExpenseSplit.amount (per participant)
///        │                                   │
///        ▼                                   ▼
///   total_paid (payer)                total_owed (participant)
///        └──────────────► net_balance ◄──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::Money;
    ///
    /// let amount = Money::from_cents(1099); // 10.99
    /// assert_eq!(amount.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a decimal amount in major units into Money.
    ///
    /// Returns `None` when the value carries more than two decimal places
    /// (sub-cent precision) or does not fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::Money;
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    ///
    /// let amount = Money::from_decimal(Decimal::from_str("12.50").unwrap()).unwrap();
    /// assert_eq!(amount.cents(), 1250);
    ///
    /// assert!(Money::from_decimal(Decimal::from_str("0.001").unwrap()).is_none());
    /// ```
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value.normalize().scale() > 2 {
            return None;
        }
        let cents = value.checked_mul(Decimal::ONE_HUNDRED)?;
        cents.to_i64().map(Money)
    }

    /// Returns the value as a decimal in major units (`1250` cents → `12.50`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Splits a non-negative amount into `parts` shares that differ by at
    /// most one cent.
    ///
    /// ## Remainder Policy
    /// `amount mod parts` leftover cents go one each to the first shares.
    /// ```text
    /// 1000 cents / 3
    ///      │
    ///      ├── base share: 333
    ///      ├── leftover:   1
    ///      ▼
    /// [334, 333, 333]  (first share absorbs the leftover cent)
    /// ```
    ///
    /// Returns an empty vector when `parts` is zero.
    pub fn split_evenly(&self, parts: usize) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }

        let parts_i64 = parts as i64;
        let base = self.0 / parts_i64;
        let leftover = (self.0 % parts_i64) as usize;

        (0..parts)
            .map(|i| if i < leftover { Money(base + 1) } else { Money(base) })
            .collect()
    }

    /// Allocates a non-negative amount proportionally to `weights` using the
    /// largest-remainder method.
    ///
    /// ## How It Works
    /// 1. Each share's exact value is `amount × weight / Σweights`
    /// 2. Every share is floored to whole cents
    /// 3. Leftover cents go one each to the largest fractional remainders;
    ///    ties go to the earlier weight
    ///
    /// The returned shares always sum to `self`.
    ///
    /// Returns `None` when `weights` is empty, contains a negative weight,
    /// sums to zero, or the arithmetic overflows.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let amount = Money::from_cents(100);
    /// let weights = [Decimal::ONE, Decimal::ONE, Decimal::ONE];
    /// let shares = amount.allocate(&weights).unwrap();
    /// assert_eq!(shares.iter().copied().sum::<Money>(), amount);
    /// ```
    pub fn allocate(&self, weights: &[Decimal]) -> Option<Vec<Money>> {
        if weights.is_empty() || weights.iter().any(|w| w.is_sign_negative()) {
            return None;
        }

        let total = weights
            .iter()
            .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))?;
        if total.is_zero() {
            return None;
        }

        let amount = Decimal::from(self.0);
        let mut shares = Vec::with_capacity(weights.len());
        let mut remainders = Vec::with_capacity(weights.len());

        for (index, weight) in weights.iter().enumerate() {
            let exact = amount.checked_mul(*weight)?.checked_div(total)?;
            let floor = exact.floor();
            shares.push(floor.to_i64()?);
            remainders.push((index, exact - floor));
        }

        // Stable sort: equal remainders keep request order
        remainders.sort_by(|a, b| b.1.cmp(&a.1));

        let allocated: i64 = shares.iter().sum();
        let mut leftover = self.0 - allocated;

        // Decimal rounding can leave the floors one cent off in either
        // direction, so walk the ranking until the books balance.
        let mut ranked = remainders.iter().map(|(index, _)| *index).cycle();
        while leftover > 0 {
            let index = ranked.next()?;
            shares[index] += 1;
            leftover -= 1;
        }
        let mut reversed = remainders.iter().rev().map(|(index, _)| *index).cycle();
        while leftover < 0 {
            let index = reversed.next()?;
            shares[index] -= 1;
            leftover += 1;
        }

        Some(shares.into_iter().map(Money).collect())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as major.minor units, e.g. `12.50` or `-3.05`.
///
/// ## Note
/// This is for logs and debugging. Presentation layers own localized
/// formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
