//! # Checkout Orchestrator
//!
//! Wraps a [`PaymentSession`] with the one asynchronous step of a sale: the
//! hand-off of a finished [`PaymentRecord`] to the [`PaymentCompleter`].
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit()                                                               │
//! │    │                                                                    │
//! │    ├── lock ─► begin_submit ─► unlock      (Selecting → Processing)     │
//! │    │                                                                    │
//! │    ├── completer.complete_payment(&record).await   (no lock held)       │
//! │    │                                                                    │
//! │    ├── lock ─► finish_submit ─► unlock     (→ Succeeded | Selecting)    │
//! │    │                                                                    │
//! │    └── notify + schedule auto-close on success                          │
//! │                                                                         │
//! │  A second submit() while the first awaits sees Processing and gets      │
//! │  CheckoutError::Busy, so the completer runs once per submission.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use till_core::{quick_amounts, CardDetails, MobileDetails, Money, OrderTotals, PaymentMethod};

use crate::config::{CheckoutConfig, CurrencyFormat};
use crate::error::{CheckoutError, CheckoutResult, CompletionError};
use crate::notify::{CurrentUser, Notice, Notifier};
use crate::session::{CheckoutPhase, PaymentRecord, PaymentSession, SessionSnapshot};

// =============================================================================
// Completer
// =============================================================================

/// The external step that actually records a payment (persist the sale,
/// print the receipt, talk to the terminal).
#[async_trait]
pub trait PaymentCompleter: Send + Sync {
    async fn complete_payment(&self, record: &PaymentRecord) -> Result<(), CompletionError>;
}

// =============================================================================
// Checkout
// =============================================================================

/// Shared handle to the payment modal. Cheap to clone.
#[derive(Clone)]
pub struct Checkout {
    session: Arc<Mutex<PaymentSession>>,
    completer: Arc<dyn PaymentCompleter>,
    notifier: Arc<dyn Notifier>,
    user: CurrentUser,
    currency: CurrencyFormat,
    denominations: Vec<Money>,
    auto_close_after: Duration,
}

impl Checkout {
    pub fn new(
        user: CurrentUser,
        completer: Arc<dyn PaymentCompleter>,
        notifier: Arc<dyn Notifier>,
        config: &CheckoutConfig,
    ) -> Self {
        Checkout {
            session: Arc::new(Mutex::new(
                PaymentSession::new(user.id.clone()).with_minor_digits(config.currency.decimals),
            )),
            completer,
            notifier,
            user,
            currency: config.currency.clone(),
            denominations: config.denominations(),
            auto_close_after: config.success_close_delay(),
        }
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Runs `f` against the session under the lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&PaymentSession) -> R) -> R {
        let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&session)
    }

    fn with_session_mut<R>(&self, f: impl FnOnce(&mut PaymentSession) -> R) -> R {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.with_session(PaymentSession::snapshot)
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.with_session(PaymentSession::phase)
    }

    /// Quick-cash suggestions for the open order.
    pub fn quick_amounts(&self) -> Vec<Money> {
        let total = self.with_session(|s| s.totals().total);
        quick_amounts(total, &self.denominations)
    }

    // =========================================================================
    // Modal
    // =========================================================================

    pub fn open(&self, totals: OrderTotals) -> CheckoutResult<()> {
        self.with_session_mut(|s| s.open(totals))?;
        info!(
            cashier_id = %self.user.id,
            total = %totals.total,
            "Checkout opened"
        );
        Ok(())
    }

    pub fn close(&self) -> CheckoutResult<()> {
        self.with_session_mut(PaymentSession::close)
    }

    pub fn select_method(&self, method: PaymentMethod) -> CheckoutResult<()> {
        self.with_session_mut(|s| s.select_method(method))
    }

    pub fn add_denomination(&self, amount: Money) -> CheckoutResult<()> {
        self.with_session_mut(|s| s.add_denomination(amount))
    }

    pub fn set_exact(&self) -> CheckoutResult<()> {
        self.with_session_mut(PaymentSession::set_exact)
    }

    pub fn clear_tender(&self) -> CheckoutResult<()> {
        self.with_session_mut(PaymentSession::clear_tender)
    }

    pub fn set_manual_amount(&self, input: &str) -> CheckoutResult<()> {
        self.with_session_mut(|s| s.set_manual_amount(input))
    }

    pub fn set_card_details(&self, details: Option<CardDetails>) -> CheckoutResult<()> {
        self.with_session_mut(|s| s.set_card_details(details))
    }

    pub fn set_mobile_details(&self, details: MobileDetails) -> CheckoutResult<()> {
        self.with_session_mut(|s| s.set_mobile_details(details))
    }

    pub fn dismiss_error(&self) {
        self.with_session_mut(PaymentSession::dismiss_error)
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Validates, hands the record to the completer and applies the outcome.
    ///
    /// Validation errors stay inline on the session. Completer failures are
    /// also raised through the notifier. Must be called inside a tokio
    /// runtime: success schedules the auto-close.
    pub async fn submit(&self) -> CheckoutResult<PaymentRecord> {
        let (record, generation) =
            self.with_session_mut(|s| s.begin_submit(Utc::now()).map(|r| (r, s.generation())))?;

        debug!(payment_id = %record.id, "Calling payment completer");
        let in_flight = InFlight::new(self, &record.id);
        let outcome = self.completer.complete_payment(&record).await;
        in_flight.settle();

        let result = self.with_session_mut(|s| s.finish_submit(record, outcome));
        match &result {
            Ok(record) => {
                let message = match record.method {
                    PaymentMethod::Cash if record.change.is_positive() => format!(
                        "Payment completed. Change due: {}",
                        self.currency.format(record.change)
                    ),
                    _ => "Payment completed".to_string(),
                };
                self.notifier.notify(Notice::success(message));
                self.schedule_auto_close(generation);
            }
            Err(CheckoutError::External { message }) => {
                self.notifier.notify(Notice::error(message.clone()));
            }
            Err(_) => {}
        }

        result
    }

    /// Closes the success screen after the configured delay, unless the
    /// cashier already closed it (or opened another sale) in the meantime.
    fn schedule_auto_close(&self, generation: u64) {
        let session = Arc::clone(&self.session);
        let delay = self.auto_close_after;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
            if session.phase() == CheckoutPhase::Succeeded
                && session.generation() == generation
                && session.close().is_ok()
            {
                debug!(generation, "Checkout auto-closed");
            }
        });
    }
}

// =============================================================================
// In-Flight Guard
// =============================================================================

/// Held across the completer await. If `submit` is dropped (timeout, torn
/// down UI task) or the completer panics, the guard drops unsettled and
/// releases the session from Processing.
struct InFlight<'a> {
    checkout: &'a Checkout,
    payment_id: Option<String>,
}

impl<'a> InFlight<'a> {
    fn new(checkout: &'a Checkout, payment_id: &str) -> Self {
        InFlight {
            checkout,
            payment_id: Some(payment_id.to_string()),
        }
    }

    /// The completer returned; `finish_submit` takes over.
    fn settle(mut self) {
        self.payment_id = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(payment_id) = self.payment_id.take() {
            self.checkout
                .with_session_mut(|s| s.abandon_submit(&payment_id));
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
