//! # Cash Tender
//!
//! Tracks the cash the customer hands over and derives change or shortfall.
//!
//! ## Cashier Actions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payment modal (cash)                  CashTender                       │
//! │  ───────────────────                   ──────────                       │
//! │  [ $20 ] button ─────────────────────► add_denomination(2000)           │
//! │  [ Exact ] button ───────────────────► set_exact(total)                 │
//! │  [ Clear ] button ───────────────────► clear()                          │
//! │  keypad "120.50" ────────────────────► set_manual("120.50", 2)          │
//! │                                                                         │
//! │  footer ◄──────────────────────────── change_or_shortfall(total)        │
//! │         "Change: $20.50" / "Short by: $19.50"                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Change owed or shortfall remaining for a given total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSummary {
    pub change: Money,
    pub insufficient: bool,
    pub shortfall: Money,
}

/// The received-amount scalar behind the cash payment screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashTender {
    received: Money,
}

impl CashTender {
    pub fn new() -> Self {
        CashTender::default()
    }

    /// Starts pre-seeded with the amount due, as the payment modal does.
    pub fn seeded(total: Money) -> Self {
        CashTender {
            received: total.non_negative(),
        }
    }

    #[inline]
    pub fn received(&self) -> Money {
        self.received
    }

    /// Adds a bill or coin to the received amount.
    pub fn add_denomination(&mut self, amount: Money) {
        self.received += amount.non_negative();
    }

    /// Customer pays the exact amount due.
    pub fn set_exact(&mut self, total: Money) {
        self.received = total.non_negative();
    }

    pub fn clear(&mut self) {
        self.received = Money::zero();
    }

    /// Sets the received amount from keypad text, read in a currency with
    /// `decimals` minor digits.
    ///
    /// Empty, malformed or negative input leaves the tender at zero.
    pub fn set_manual(&mut self, input: &str, decimals: u8) {
        self.received = Money::parse_scaled(input, decimals)
            .map(|m| m.non_negative())
            .unwrap_or_default();
    }

    pub fn change_or_shortfall(&self, total: Money) -> ChangeSummary {
        let diff = self.received - total;
        ChangeSummary {
            change: diff.non_negative(),
            insufficient: self.received < total,
            shortfall: (total - self.received).non_negative(),
        }
    }
}

/// Quick-cash suggestions for the amount due.
///
/// For each denomination, the smallest multiple of it that covers `total`;
/// duplicates are dropped and the result is sorted ascending. With bills of
/// $5/$10/$20/$50 and $37.40 due, the buttons read $40, $50.
pub fn quick_amounts(total: Money, denominations: &[Money]) -> Vec<Money> {
    let due = total.cents();
    if due <= 0 {
        return Vec::new();
    }

    let mut amounts: Vec<Money> = denominations
        .iter()
        .map(|d| d.cents())
        .filter(|d| *d > 0)
        .map(|d| Money::from_cents(((due + d - 1) / d) * d))
        .collect();

    amounts.sort();
    amounts.dedup();
    amounts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(cents: i64) -> Money {
        Money::from_cents(cents)
    }

    #[test]
    fn test_change_for_overpayment() {
        let mut tender = CashTender::new();
        tender.set_manual("120.00", 2);

        let summary = tender.change_or_shortfall(m(10_000));
        assert_eq!(summary.change, m(2_000));
        assert!(!summary.insufficient);
        assert_eq!(summary.shortfall, Money::zero());
    }

    #[test]
    fn test_shortfall_for_underpayment() {
        let mut tender = CashTender::new();
        tender.set_manual("80", 2);

        let summary = tender.change_or_shortfall(m(10_000));
        assert_eq!(summary.change, Money::zero());
        assert!(summary.insufficient);
        assert_eq!(summary.shortfall, m(2_000));
    }

    #[test]
    fn test_denominations_accumulate() {
        let mut tender = CashTender::new();
        tender.add_denomination(m(5_000));
        tender.add_denomination(m(2_000));
        tender.add_denomination(m(2_000));
        assert_eq!(tender.received(), m(9_000));

        tender.clear();
        assert_eq!(tender.received(), Money::zero());
    }

    #[test]
    fn test_exact_and_seeded() {
        let mut tender = CashTender::seeded(m(13_500));
        assert_eq!(tender.received(), m(13_500));

        tender.clear();
        tender.set_exact(m(4_250));
        let summary = tender.change_or_shortfall(m(4_250));
        assert!(!summary.insufficient);
        assert!(summary.change.is_zero());
    }

    #[test]
    fn test_manual_garbage_is_zero() {
        let mut tender = CashTender::seeded(m(1_000));
        for input in ["", "   ", "abc", "12,3x", "-40"] {
            tender.set_manual(input, 2);
            assert_eq!(tender.received(), Money::zero(), "input {input:?}");
        }
    }

    #[test]
    fn test_manual_respects_minor_digits() {
        let mut tender = CashTender::new();
        tender.set_manual("120", 0);
        assert_eq!(tender.received(), m(120));

        tender.set_manual("1.5", 3);
        assert_eq!(tender.received(), m(1_500));
    }

    #[test]
    fn test_change_or_shortfall_is_idempotent() {
        let mut tender = CashTender::new();
        tender.set_manual("55.55", 2);
        let total = m(4_999);
        assert_eq!(tender.change_or_shortfall(total), tender.change_or_shortfall(total));
    }

    #[test]
    fn test_change_reads_latest_amount() {
        let mut tender = CashTender::new();
        let total = m(10_000);
        assert!(tender.change_or_shortfall(total).insufficient);

        tender.add_denomination(m(10_000));
        assert!(!tender.change_or_shortfall(total).insufficient);
    }

    #[test]
    fn test_quick_amounts() {
        let bills = [m(500), m(1_000), m(2_000), m(5_000)];
        assert_eq!(quick_amounts(m(3_740), &bills), vec![m(4_000), m(5_000)]);
        assert_eq!(quick_amounts(m(2_000), &bills), vec![m(2_000), m(5_000)]);
        assert!(quick_amounts(Money::zero(), &bills).is_empty());
    }
}
