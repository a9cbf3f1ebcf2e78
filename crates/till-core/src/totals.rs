//! # Order Totals
//!
//! Composes the figures shown at the bottom of the checkout screen.
//!
//! ```text
//! subtotal ──► − discount ──► + tax (on discounted base) ──► total
//! ```
//!
//! The order is fixed: the discount is taken before tax, and tax is charged
//! on what the customer actually pays for.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::discount::Discount;
use crate::money::Money;
use crate::types::TaxRate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

/// Computes order totals.
///
/// The evaluator already keeps a discount below the subtotal; the total is
/// still clamped so a stale discount can never produce a negative amount due.
///
/// ```rust
/// use till_core::{compute_totals, Money, TaxRate};
///
/// let totals = compute_totals(Money::from_cents(10_000), None, TaxRate::from_bps(1_000));
/// assert_eq!(totals.total.cents(), 11_000);
/// ```
pub fn compute_totals(subtotal: Money, discount: Option<&Discount>, tax_rate: TaxRate) -> OrderTotals {
    let subtotal = subtotal.non_negative();
    let discount = discount
        .map(|d| d.amount().min(subtotal))
        .unwrap_or_default();

    let taxable = subtotal - discount;
    let tax = taxable.calculate_tax(tax_rate);

    OrderTotals {
        subtotal,
        discount,
        tax,
        total: (taxable + tax).non_negative(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::{evaluate_discount, DiscountPolicy, DiscountValue};
    use crate::types::Percent;
    use chrono::Utc;

    fn discount(subtotal: Money, value: DiscountValue) -> Discount {
        evaluate_discount(subtotal, value, &DiscountPolicy::default())
            .unwrap()
            .into_discount("test", Utc::now())
            .unwrap()
    }

    #[test]
    fn test_ten_percent_off_150() {
        let subtotal = Money::from_cents(15_000);
        let d = discount(subtotal, DiscountValue::Percentage(Percent::from_bps(1_000)));

        let totals = compute_totals(subtotal, Some(&d), TaxRate::zero());
        assert_eq!(totals.discount, Money::from_cents(1_500));
        assert_eq!(totals.total, Money::from_cents(13_500));
    }

    #[test]
    fn test_tax_applies_after_discount() {
        let subtotal = Money::from_cents(10_000);
        let d = discount(subtotal, DiscountValue::Fixed(Money::from_cents(2_000)));

        let totals = compute_totals(subtotal, Some(&d), TaxRate::from_bps(825));
        // 80.00 × 8.25% = 6.60
        assert_eq!(totals.tax, Money::from_cents(660));
        assert_eq!(totals.total, Money::from_cents(8_660));
        assert_eq!(totals.total, totals.subtotal - totals.discount + totals.tax);
    }

    #[test]
    fn test_stale_discount_never_goes_negative() {
        let d = discount(Money::from_cents(10_000), DiscountValue::Fixed(Money::from_cents(5_000)));

        let totals = compute_totals(Money::from_cents(3_000), Some(&d), TaxRate::from_bps(1_000));
        assert_eq!(totals.discount, Money::from_cents(3_000));
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_no_discount_no_tax() {
        let totals = compute_totals(Money::from_cents(4_200), None, TaxRate::zero());
        assert_eq!(totals.total, Money::from_cents(4_200));
        assert!(totals.discount.is_zero());
        assert!(totals.tax.is_zero());
    }
}
