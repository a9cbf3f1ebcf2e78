//! # Discount Evaluator
//!
//! Turns a cashier's discount entry (percentage or fixed amount) into a
//! validated discount amount against the current subtotal.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate_discount(subtotal, value, policy)                             │
//! │                                                                         │
//! │  value <= 0 ───────────────────────────────► NotPositive                │
//! │                                                                         │
//! │  Percentage(p)                    Fixed(v)                              │
//! │   │                                │                                    │
//! │   ├─ p > min(100%, max_percent)    ├─ v >= subtotal ─► ExceedsSubtotal  │
//! │   │   ─► ExceedsMaxPercent         ├─ v > max_amount ─► ExceedsMaxAmount│
//! │   │                                │                                    │
//! │   ▼                                ▼                                    │
//! │  amount = subtotal × p           amount = v                             │
//! │                                                                         │
//! │  requires_approval = policy.approval.enabled && over threshold          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Evaluation is pure: the same inputs always produce the same quote. The
//! reason and timestamp are stamped afterwards by [`DiscountQuote::into_discount`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{DiscountError, ValidationError};
use crate::money::Money;
use crate::types::Percent;
use crate::validation::validate_discount_reason;

// =============================================================================
// Discount Value
// =============================================================================

/// What the cashier entered: a percentage of the subtotal or a flat amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountValue {
    Percentage(Percent),
    Fixed(Money),
}

// =============================================================================
// Policy
// =============================================================================

/// When a discount needs a manager's sign-off.
///
/// The thresholds are store policy rather than fixed rules, so both ratios
/// are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ApprovalPolicy {
    pub enabled: bool,
    /// Percentage discounts above this share of `max_percent` need approval.
    pub percent_ratio: Percent,
    /// Fixed discounts above this share of the subtotal need approval.
    pub fixed_ratio: Percent,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        ApprovalPolicy {
            enabled: true,
            percent_ratio: Percent::from_bps(5_000),
            fixed_ratio: Percent::from_bps(3_000),
        }
    }
}

/// Caps applied by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscountPolicy {
    pub max_percent: Percent,
    pub max_amount: Option<Money>,
    pub approval: ApprovalPolicy,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy {
            max_percent: Percent::from_bps(5_000),
            max_amount: None,
            approval: ApprovalPolicy::default(),
        }
    }
}

impl DiscountPolicy {
    /// The effective percentage ceiling: never above 100%.
    pub fn percent_ceiling(&self) -> Percent {
        self.max_percent.min(Percent::HUNDRED)
    }
}

// =============================================================================
// Quote & Discount
// =============================================================================

/// Result of a successful evaluation, before reason and time are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountQuote {
    pub value: DiscountValue,
    pub amount: Money,
    pub requires_approval: bool,
}

impl DiscountQuote {
    /// Stamps the quote with a reason and the moment it was applied.
    pub fn into_discount(self, reason: &str, applied_at: DateTime<Utc>) -> Result<Discount, ValidationError> {
        let reason = validate_discount_reason(reason)?;

        Ok(Discount {
            value: self.value,
            amount: self.amount,
            reason,
            applied_at,
            applied_by: None,
            requires_approval: self.requires_approval,
        })
    }
}

/// A discount applied to the order being built.
///
/// `amount` is only ever produced by [`evaluate_discount`]; it is not
/// settable from outside this module. Serialize-only for the same reason:
/// a discount is rebuilt through the evaluator, never read back from JSON.
///
/// ```compile_fail
/// let discount: till_core::Discount = serde_json::from_str("{}").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub value: DiscountValue,
    amount: Money,
    pub reason: String,
    #[ts(as = "String")]
    pub applied_at: DateTime<Utc>,
    /// Id of the user who applied it.
    pub applied_by: Option<String>,
    pub requires_approval: bool,
}

impl Discount {
    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn with_author(mut self, user_id: impl Into<String>) -> Self {
        self.applied_by = Some(user_id.into());
        self
    }

    /// Re-evaluates this discount against a changed subtotal.
    ///
    /// The cart can change after the discount was applied; a fixed discount
    /// may no longer fit, in which case the evaluator's error is returned.
    pub fn reprice(&self, subtotal: Money, policy: &DiscountPolicy) -> Result<Discount, DiscountError> {
        let quote = evaluate_discount(subtotal, self.value, policy)?;
        Ok(Discount {
            value: quote.value,
            amount: quote.amount,
            reason: self.reason.clone(),
            applied_at: self.applied_at,
            applied_by: self.applied_by.clone(),
            requires_approval: quote.requires_approval,
        })
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Validates a discount entry and computes its amount.
///
/// ## Example
/// ```rust
/// use till_core::{evaluate_discount, DiscountError, DiscountPolicy, DiscountValue, Money, Percent};
///
/// let policy = DiscountPolicy::default(); // 50% cap
/// let subtotal = Money::from_cents(10_000);
///
/// let err = evaluate_discount(subtotal, DiscountValue::Percentage(Percent::from_bps(6_000)), &policy);
/// assert!(matches!(err, Err(DiscountError::ExceedsMaxPercent { .. })));
/// ```
pub fn evaluate_discount(
    subtotal: Money,
    value: DiscountValue,
    policy: &DiscountPolicy,
) -> Result<DiscountQuote, DiscountError> {
    let subtotal = subtotal.non_negative();
    let approval = &policy.approval;

    let (amount, over_threshold) = match value {
        DiscountValue::Percentage(pct) => {
            if pct.is_zero() {
                return Err(DiscountError::NotPositive);
            }

            let ceiling = policy.percent_ceiling();
            if pct > ceiling {
                return Err(DiscountError::ExceedsMaxPercent { max: ceiling });
            }

            let threshold = policy.max_percent.scaled_by(approval.percent_ratio);
            (subtotal.percent_of(pct), pct > threshold)
        }
        DiscountValue::Fixed(amount) => {
            if !amount.is_positive() {
                return Err(DiscountError::NotPositive);
            }

            if amount >= subtotal {
                return Err(DiscountError::ExceedsSubtotal { subtotal });
            }

            if let Some(max) = policy.max_amount {
                if amount > max {
                    return Err(DiscountError::ExceedsMaxAmount { max });
                }
            }

            let threshold = subtotal.percent_of(approval.fixed_ratio);
            (amount, amount > threshold)
        }
    };

    Ok(DiscountQuote {
        value,
        amount,
        requires_approval: approval.enabled && over_threshold,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
