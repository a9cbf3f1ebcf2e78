//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Checkout math in floats:                                               │
//! │    150.00 * 0.1 = 15.000000000000002                                    │
//! │    120.00 - 100.10 = 19.900000000000006                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    15000 cents * 1000 bps / 10000 = 1500 cents                          │
//! │    12000 cents - 10010 cents = 1990 cents                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let total = price * 2 + Money::from_cents(500);
//! assert_eq!(total.cents(), 2698);
//!
//! // Cashier keyboard input is parsed without going through f64
//! assert_eq!(Money::parse_decimal("12.50"), Some(Money::from_cents(1250)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{Percent, TaxRate};

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Signed so that shortfalls and refunds can be represented, but the checkout
/// never hands a negative amount to the payment completer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses free-text decimal input such as `"120"`, `"99.9"` or `"1,250.00"`
    /// into cents.
    ///
    /// Digits past the second decimal place are rounded half-up. Commas are
    /// accepted only as thousands separators. Returns `None` for anything
    /// that is not a plain decimal number.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("99.9"), Some(Money::from_cents(9990)));
    /// assert_eq!(Money::parse_decimal("0.125"), Some(Money::from_cents(13)));
    /// assert_eq!(Money::parse_decimal("1,5"), None);
    /// assert_eq!(Money::parse_decimal("abc"), None);
    /// assert_eq!(Money::parse_decimal(""), None);
    /// ```
    pub fn parse_decimal(input: &str) -> Option<Money> {
        Self::parse_scaled(input, 2)
    }

    /// Parses decimal input into minor units of a currency with `decimals`
    /// fraction digits (0 for JPY, 3 for BHD).
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::parse_scaled("120", 0), Some(Money::from_cents(120)));
    /// assert_eq!(Money::parse_scaled("1.5", 3), Some(Money::from_cents(1_500)));
    /// ```
    pub fn parse_scaled(input: &str, decimals: u8) -> Option<Money> {
        let trimmed = input.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, frac) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };
        let whole = strip_thousands(whole)?;

        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let scale = 10_i64.checked_pow(decimals as u32)?;
        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().ok()?.checked_mul(scale)?
        };

        let mut digits = frac.bytes().map(|b| (b - b'0') as i64);
        let mut minor = 0_i64;
        for _ in 0..decimals {
            minor = minor * 10 + digits.next().unwrap_or(0);
        }
        let round_up = digits.next().map_or(false, |d| d >= 5);

        let mut units = whole_units.checked_add(minor)?;
        if round_up {
            units = units.checked_add(1)?;
        }

        Some(Money(if negative { -units } else { units }))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// Returns `rate` percent of this amount, rounded half-up to the cent.
    ///
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::Percent;
    ///
    /// let subtotal = Money::from_cents(15_000);
    /// assert_eq!(subtotal.percent_of(Percent::from_bps(1000)).cents(), 1_500);
    /// ```
    pub fn percent_of(&self, rate: Percent) -> Money {
        Money(round_bps(self.0, rate.bps()))
    }

    /// Calculates tax on this amount.
    ///
    /// Integer math: `(amount * bps + 5000) / 10000`.
    ///
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(1000);
    /// // $10.00 × 8.25% = $0.825 → $0.83
    /// assert_eq!(base.calculate_tax(TaxRate::from_bps(825)).cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(round_bps(self.0, rate.bps()))
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Removes thousands separators from the integer part.
///
/// Groups after the first must be exactly three digits: `"1,250"` is fine,
/// `"1,5"` and `"1,,2"` are not.
fn strip_thousands(whole: &str) -> Option<String> {
    if !whole.contains(',') {
        return Some(whole.to_string());
    }

    let mut groups = whole.split(',');
    let head = groups.next()?;
    if head.is_empty() || head.len() > 3 {
        return None;
    }

    let mut cleaned = head.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        cleaned.push_str(group);
    }
    Some(cleaned)
}

/// Half-up rounding of `amount * bps / 10000`, computed in i128.
fn round_bps(amount: i64, bps: u32) -> i64 {
    let scaled = amount as i128 * bps as i128;
    let rounded = if scaled >= 0 {
        (scaled + BPS_SCALE / 2) / BPS_SCALE
    } else {
        (scaled - BPS_SCALE / 2) / BPS_SCALE
    };
    rounded as i64
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly dollar rendering. The checkout UI formats through
/// the configured currency symbol instead.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.dollars().abs(), self.cents_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
