//! # Payment Session
//!
//! The state machine behind the payment modal. Purely synchronous: the one
//! asynchronous step (the payment completer) is driven from
//! [`Checkout`](crate::Checkout), which calls [`PaymentSession::begin_submit`]
//! and [`PaymentSession::finish_submit`] on either side of the await.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Idle ──open(totals)──► Selecting ◄──────────────────────┐             │
//! │    ▲                      │   ▲  select_method / tender   │             │
//! │    │                      │   └──────────┘                │             │
//! │    │                 begin_submit                         │             │
//! │    │                      ▼                               │             │
//! │    │                  Validating ──invalid──► Selecting   │             │
//! │    │                      │                  (inline err) │             │
//! │    │                    valid                             │             │
//! │    │                      ▼                               │             │
//! │    │                  Processing ──completer Err──────────┘             │
//! │    │                      │                (banner err, no retry)       │
//! │    │                 completer Ok                                       │
//! │    │                      ▼                                             │
//! │    └──close / auto── Succeeded                                          │
//! │                                                                         │
//! │  While Processing: submit, close and method changes are refused.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use till_core::{
    CardDetails, CashTender, ChangeSummary, MobileDetails, Money, OrderTotals, PaymentDetails,
    PaymentMethod,
};

use crate::error::{CheckoutError, CheckoutResult, CompletionError, PaymentValidationError};

/// Banner shown when a payment was in flight and its outcome was lost.
pub const PAYMENT_INTERRUPTED: &str =
    "Payment was interrupted before it completed. Check the terminal before retrying.";

// =============================================================================
// Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Modal closed.
    Idle,
    /// Cashier is choosing a method and entering tender.
    Selecting,
    /// Submission is being checked.
    Validating,
    /// Waiting on the payment completer.
    Processing,
    /// Payment completed; the modal shows the success screen.
    Succeeded,
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutPhase::Idle => "idle",
            CheckoutPhase::Selecting => "selecting",
            CheckoutPhase::Validating => "validating",
            CheckoutPhase::Processing => "processing",
            CheckoutPhase::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Payment Record
// =============================================================================

/// What the payment completer receives. Built once per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub method: PaymentMethod,
    /// Amount charged: the order total.
    pub amount: Money,
    pub received_amount: Money,
    pub change: Money,
    pub details: PaymentDetails,
    pub totals: OrderTotals,
    pub cashier_id: String,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Read-only view for rendering the modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: CheckoutPhase,
    pub method: PaymentMethod,
    pub totals: OrderTotals,
    pub received: Money,
    pub change: ChangeSummary,
    pub error: Option<String>,
    pub can_submit: bool,
    pub can_close: bool,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone)]
pub struct PaymentSession {
    phase: CheckoutPhase,
    /// Bumped on every `open`, so a delayed auto-close can tell whether the
    /// modal it was scheduled for is still the one on screen.
    generation: u64,
    cashier_id: String,
    /// Fraction digits of the till currency; keypad input is read with these.
    minor_digits: u8,
    totals: OrderTotals,
    method: PaymentMethod,
    tender: CashTender,
    card: Option<CardDetails>,
    mobile: MobileDetails,
    error: Option<String>,
    completed: Option<PaymentRecord>,
}

impl PaymentSession {
    pub fn new(cashier_id: impl Into<String>) -> Self {
        PaymentSession {
            phase: CheckoutPhase::Idle,
            generation: 0,
            cashier_id: cashier_id.into(),
            minor_digits: 2,
            totals: OrderTotals::default(),
            method: PaymentMethod::Cash,
            tender: CashTender::new(),
            card: None,
            mobile: MobileDetails::default(),
            error: None,
            completed: None,
        }
    }

    /// Sets the currency's fraction digits (2 unless configured otherwise).
    pub fn with_minor_digits(mut self, digits: u8) -> Self {
        self.minor_digits = digits;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    pub fn received(&self) -> Money {
        self.tender.received()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The record of the payment that succeeded, if any.
    pub fn completed(&self) -> Option<&PaymentRecord> {
        self.completed.as_ref()
    }

    pub fn change_summary(&self) -> ChangeSummary {
        self.tender.change_or_shortfall(self.totals.total)
    }

    pub fn can_submit(&self) -> bool {
        self.phase == CheckoutPhase::Selecting
    }

    pub fn can_close(&self) -> bool {
        !matches!(self.phase, CheckoutPhase::Processing | CheckoutPhase::Validating)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            method: self.method,
            totals: self.totals,
            received: self.tender.received(),
            change: self.change_summary(),
            error: self.error.clone(),
            can_submit: self.can_submit(),
            can_close: self.can_close(),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Opens the modal for an order. Cash is pre-seeded with the total.
    pub fn open(&mut self, totals: OrderTotals) -> CheckoutResult<()> {
        if self.phase != CheckoutPhase::Idle {
            return Err(self.invalid("open"));
        }

        self.generation += 1;
        self.totals = totals;
        self.method = PaymentMethod::Cash;
        self.tender = CashTender::seeded(totals.total);
        self.card = None;
        self.mobile = MobileDetails::default();
        self.error = None;
        self.completed = None;
        self.phase = CheckoutPhase::Selecting;

        debug!(generation = self.generation, total = %totals.total, "Payment session opened");
        Ok(())
    }

    /// Switches payment method. Resets the cash amount and clears the error.
    pub fn select_method(&mut self, method: PaymentMethod) -> CheckoutResult<()> {
        self.ensure_selecting("change payment method")?;

        self.method = method;
        self.tender = CashTender::seeded(self.totals.total);
        self.error = None;

        debug!(%method, "Payment method selected");
        Ok(())
    }

    pub fn add_denomination(&mut self, amount: Money) -> CheckoutResult<()> {
        self.ensure_selecting("change tender")?;
        self.tender.add_denomination(amount);
        Ok(())
    }

    pub fn set_exact(&mut self) -> CheckoutResult<()> {
        self.ensure_selecting("change tender")?;
        self.tender.set_exact(self.totals.total);
        Ok(())
    }

    pub fn clear_tender(&mut self) -> CheckoutResult<()> {
        self.ensure_selecting("change tender")?;
        self.tender.clear();
        Ok(())
    }

    pub fn set_manual_amount(&mut self, input: &str) -> CheckoutResult<()> {
        self.ensure_selecting("change tender")?;
        self.tender.set_manual(input, self.minor_digits);
        Ok(())
    }

    pub fn set_card_details(&mut self, details: Option<CardDetails>) -> CheckoutResult<()> {
        self.ensure_selecting("change card details")?;
        self.card = details;
        Ok(())
    }

    pub fn set_mobile_details(&mut self, details: MobileDetails) -> CheckoutResult<()> {
        self.ensure_selecting("change mobile details")?;
        self.mobile = details;
        Ok(())
    }

    /// Dismisses the error banner.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Validates the submission and moves to Processing.
    ///
    /// On a validation failure the session is back in Selecting with the
    /// error set for inline display. On success the returned record is the
    /// one to hand to the completer.
    pub fn begin_submit(&mut self, now: DateTime<Utc>) -> CheckoutResult<PaymentRecord> {
        self.ensure_selecting("submit")?;
        self.phase = CheckoutPhase::Validating;

        let record = match self.validate() {
            Ok(details) => self.build_record(details, now),
            Err(e) => {
                debug!(error = %e, "Payment validation failed");
                self.error = Some(e.to_string());
                self.phase = CheckoutPhase::Selecting;
                return Err(e.into());
            }
        };

        self.error = None;
        self.phase = CheckoutPhase::Processing;
        info!(
            payment_id = %record.id,
            method = %record.method,
            amount = %record.amount,
            "Payment processing"
        );
        Ok(record)
    }

    /// Applies the completer's outcome to the in-flight record.
    pub fn finish_submit(
        &mut self,
        record: PaymentRecord,
        outcome: Result<(), CompletionError>,
    ) -> CheckoutResult<PaymentRecord> {
        if self.phase != CheckoutPhase::Processing {
            return Err(self.invalid("finish payment"));
        }

        match outcome {
            Ok(()) => {
                info!(payment_id = %record.id, change = %record.change, "Payment completed");
                self.phase = CheckoutPhase::Succeeded;
                self.completed = Some(record.clone());
                Ok(record)
            }
            Err(e) => {
                warn!(payment_id = %record.id, error = %e, "Payment completion failed");
                self.phase = CheckoutPhase::Selecting;
                self.error = Some(e.message.clone());
                Err(CheckoutError::External { message: e.message })
            }
        }
    }

    /// Releases a payment whose outcome will never arrive: the submitting
    /// task was dropped or the completer panicked. Back to Selecting with an
    /// error so the cashier can check the terminal and retry.
    pub fn abandon_submit(&mut self, payment_id: &str) {
        if self.phase != CheckoutPhase::Processing {
            return;
        }

        warn!(payment_id, "Payment interrupted before completion");
        self.phase = CheckoutPhase::Selecting;
        self.error = Some(PAYMENT_INTERRUPTED.to_string());
    }

    /// Closes the modal. Refused while a payment is in flight.
    pub fn close(&mut self) -> CheckoutResult<()> {
        if !self.can_close() {
            return Err(CheckoutError::Busy);
        }

        if self.phase != CheckoutPhase::Idle {
            debug!(phase = %self.phase, "Payment session closed");
        }
        self.phase = CheckoutPhase::Idle;
        self.error = None;
        self.card = None;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn validate(&self) -> Result<PaymentDetails, PaymentValidationError> {
        match self.method {
            PaymentMethod::Cash => {
                let summary = self.change_summary();
                if summary.insufficient {
                    return Err(PaymentValidationError::InsufficientAmount {
                        total: self.totals.total,
                        received: self.tender.received(),
                        shortfall: summary.shortfall,
                    });
                }
                Ok(PaymentDetails::Cash)
            }
            PaymentMethod::Card => self
                .card
                .clone()
                .map(PaymentDetails::Card)
                .ok_or(PaymentValidationError::MissingCardDetails),
            PaymentMethod::Mobile => Ok(PaymentDetails::Mobile(self.mobile.clone())),
        }
    }

    fn build_record(&self, details: PaymentDetails, now: DateTime<Utc>) -> PaymentRecord {
        let total = self.totals.total;
        let (received_amount, change) = match self.method {
            PaymentMethod::Cash => (self.tender.received(), self.change_summary().change),
            PaymentMethod::Card | PaymentMethod::Mobile => (total, Money::zero()),
        };

        PaymentRecord {
            id: Uuid::new_v4().to_string(),
            method: self.method,
            amount: total,
            received_amount,
            change,
            details,
            totals: self.totals,
            cashier_id: self.cashier_id.clone(),
            timestamp: now,
        }
    }

    fn ensure_selecting(&self, action: &'static str) -> CheckoutResult<()> {
        match self.phase {
            CheckoutPhase::Selecting => Ok(()),
            CheckoutPhase::Processing | CheckoutPhase::Validating => Err(CheckoutError::Busy),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> CheckoutError {
        CheckoutError::InvalidState {
            phase: self.phase,
            action,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
