//! # Domain Types
//!
//! Small value types shared by the discount, tender and totals modules.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Percent      │   │    TaxRate      │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  bps (u32)      │   │  Cash           │       │
//! │  │  1000 = 10%     │   │  825 = 8.25%    │   │  Card           │       │
//! │  └─────────────────┘   └─────────────────┘   │  Mobile         │       │
//! │                                              └─────────────────┘       │
//! │  ┌──────────────────────────────────────────────────────────────┐      │
//! │  │  PaymentDetails: Cash | Card(CardDetails) | Mobile(...)      │      │
//! │  └──────────────────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Percent
// =============================================================================

/// A percentage held in basis points (1 bp = 0.01%).
///
/// Discount values and approval ratios are percentages; keeping them in
/// integer basis points avoids the float drift a `12.5` percent would carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// 100%.
    pub const HUNDRED: Percent = Percent(10_000);

    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percent from a human value (`12.5` = 12.5%).
    ///
    /// Negative and non-finite inputs become 0%.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return Percent(0);
        }
        Percent((pct * 100.0).round().min(u32::MAX as f64) as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `ratio` of this percentage, e.g. half of a 50% cap is 25%.
    pub fn scaled_by(&self, ratio: Percent) -> Percent {
        let scaled = (self.0 as u64 * ratio.0 as u64 + 5_000) / 10_000;
        Percent(scaled as u32)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (825 bps = 8.25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    pub fn from_percentage(pct: f64) -> Self {
        TaxRate(Percent::from_percentage(pct).bps())
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays.
///
/// Card and mobile are placeholder paths: the card terminal or wallet
/// provider lives behind the payment completer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash, change is calculated.
    #[default]
    Cash,
    /// Card on an external terminal.
    Card,
    /// Mobile wallet / QR payment.
    Mobile,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Details
// =============================================================================

/// Card data captured by the terminal integration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    /// Last four digits, for the receipt.
    pub last4: String,
    pub brand: Option<String>,
    /// Terminal authorization code.
    pub auth_code: Option<String>,
}

/// Wallet / QR provider data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MobileDetails {
    pub provider: Option<String>,
    pub reference: Option<String>,
}

/// Method-specific details attached to a payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    Cash,
    Card(CardDetails),
    Mobile(MobileDetails),
}

impl PaymentDetails {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentDetails::Cash => PaymentMethod::Cash,
            PaymentDetails::Card(_) => PaymentMethod::Card,
            PaymentDetails::Mobile(_) => PaymentMethod::Mobile,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_from_percentage() {
        assert_eq!(Percent::from_percentage(10.0).bps(), 1000);
        assert_eq!(Percent::from_percentage(12.5).bps(), 1250);
        assert_eq!(Percent::from_percentage(-3.0).bps(), 0);
        assert_eq!(Percent::from_percentage(f64::NAN).bps(), 0);
    }

    #[test]
    fn test_percent_scaled_by() {
        let cap = Percent::from_bps(5000);
        assert_eq!(cap.scaled_by(Percent::from_bps(5000)), Percent::from_bps(2500));
        assert_eq!(Percent::HUNDRED.scaled_by(Percent::from_bps(3000)).bps(), 3000);
    }

    #[test]
    fn test_percent_display() {
        assert_eq!(Percent::from_bps(1000).to_string(), "10%");
        assert_eq!(Percent::from_bps(1250).to_string(), "12.50%");
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
        assert!(TaxRate::default().is_zero());
    }

    #[test]
    fn test_payment_method_names() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::Mobile.to_string(), "mobile");
        assert_eq!(serde_json::to_string(&PaymentMethod::Card).unwrap(), "\"card\"");
    }

    #[test]
    fn test_payment_details_serialization() {
        let details = PaymentDetails::Card(CardDetails {
            last4: "4242".to_string(),
            brand: Some("visa".to_string()),
            auth_code: None,
        });
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["method"], "card");
        assert_eq!(json["last4"], "4242");
        assert_eq!(details.method(), PaymentMethod::Card);
    }
}
