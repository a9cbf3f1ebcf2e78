//! End-to-end checkout scenarios: order draft, payment modal and completer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use till_checkout::{
    Checkout, CheckoutConfig, CheckoutError, CheckoutPhase, CompletionError, CurrentUser,
    Notice, NoticeLevel, Notifier, OrderDraft, PaymentCompleter, PaymentRecord,
    PaymentValidationError, Role,
};
use till_core::{CardDetails, DiscountValue, Money, OrderTotals, PaymentMethod, Percent};

// =============================================================================
// Test Doubles
// =============================================================================

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

impl RecordingNotifier {
    fn count(&self, level: NoticeLevel) -> usize {
        self.notices.lock().unwrap().iter().filter(|n| n.level == level).count()
    }
}

/// Fails the first `failures` calls, then succeeds. Keeps every record seen.
#[derive(Default)]
struct ScriptedCompleter {
    failures: usize,
    records: Mutex<Vec<PaymentRecord>>,
}

#[async_trait]
impl PaymentCompleter for ScriptedCompleter {
    async fn complete_payment(&self, record: &PaymentRecord) -> Result<(), CompletionError> {
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        if records.len() <= self.failures {
            return Err("Card terminal offline".into());
        }
        Ok(())
    }
}

/// Blocks until released, to hold the session in Processing.
#[derive(Default)]
struct GatedCompleter {
    calls: AtomicUsize,
    gate: Notify,
}

#[async_trait]
impl PaymentCompleter for GatedCompleter {
    async fn complete_payment(&self, _record: &PaymentRecord) -> Result<(), CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(())
    }
}

fn cashier() -> CurrentUser {
    CurrentUser::new("cashier-7", "Sam", Role::Cashier)
}

fn checkout_with(completer: Arc<dyn PaymentCompleter>) -> (Checkout, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let checkout = Checkout::new(cashier(), completer, notifier.clone(), &CheckoutConfig::default());
    (checkout, notifier)
}

fn totals(cents: i64) -> OrderTotals {
    OrderTotals {
        subtotal: Money::from_cents(cents),
        discount: Money::zero(),
        tax: Money::zero(),
        total: Money::from_cents(cents),
    }
}

async fn wait_for_phase(checkout: &Checkout, phase: CheckoutPhase) {
    while checkout.phase() != phase {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn discounted_order_paid_in_cash() {
    let notifier = Arc::new(RecordingNotifier::default());
    let mut order = OrderDraft::new(cashier(), notifier.clone(), &CheckoutConfig::default());
    order.add_item("TEA-1", "Green tea", Money::from_cents(3_000), 5).unwrap();
    order
        .apply_discount(DiscountValue::Percentage(Percent::from_bps(1_000)), "promo")
        .unwrap();

    let totals = order.totals();
    assert_eq!(totals.discount, Money::from_cents(1_500));
    assert_eq!(totals.total, Money::from_cents(13_500));

    let completer = Arc::new(ScriptedCompleter::default());
    let (checkout, _) = checkout_with(completer.clone());
    checkout.open(totals).unwrap();
    checkout.set_manual_amount("150").unwrap();

    let record = checkout.submit().await.unwrap();
    assert_eq!(record.amount, Money::from_cents(13_500));
    assert_eq!(record.change, Money::from_cents(1_500));
    assert_eq!(record.totals.discount, Money::from_cents(1_500));
    assert_eq!(record.cashier_id, "cashier-7");
    assert_eq!(completer.records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn insufficient_cash_never_reaches_completer() {
    let completer = Arc::new(ScriptedCompleter::default());
    let (checkout, notifier) = checkout_with(completer.clone());
    checkout.open(totals(10_000)).unwrap();
    checkout.set_manual_amount("80.00").unwrap();

    let err = checkout.submit().await.unwrap_err();
    match err {
        CheckoutError::Validation(PaymentValidationError::InsufficientAmount { shortfall, .. }) => {
            assert_eq!(shortfall, Money::from_cents(2_000));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let snapshot = checkout.snapshot();
    assert_eq!(snapshot.phase, CheckoutPhase::Selecting);
    assert!(snapshot.can_submit);
    assert!(completer.records.lock().unwrap().is_empty());
    assert_eq!(notifier.count(NoticeLevel::Error), 0);
}

#[tokio::test]
async fn card_payment_requires_details() {
    let completer = Arc::new(ScriptedCompleter::default());
    let (checkout, _) = checkout_with(completer.clone());
    checkout.open(totals(4_200)).unwrap();
    checkout.select_method(PaymentMethod::Card).unwrap();

    assert!(matches!(
        checkout.submit().await,
        Err(CheckoutError::Validation(PaymentValidationError::MissingCardDetails))
    ));

    checkout
        .set_card_details(Some(CardDetails {
            last4: "0005".to_string(),
            brand: Some("amex".to_string()),
            auth_code: None,
        }))
        .unwrap();
    let record = checkout.submit().await.unwrap();
    assert_eq!(record.received_amount, Money::from_cents(4_200));
    assert!(record.change.is_zero());
}

#[tokio::test]
async fn rejected_payment_can_be_retried_with_fresh_record() {
    let completer = Arc::new(ScriptedCompleter {
        failures: 1,
        ..ScriptedCompleter::default()
    });
    let (checkout, notifier) = checkout_with(completer.clone());
    checkout.open(totals(2_500)).unwrap();

    let err = checkout.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Card terminal offline");

    let snapshot = checkout.snapshot();
    assert_eq!(snapshot.phase, CheckoutPhase::Selecting);
    assert_eq!(snapshot.error.as_deref(), Some("Card terminal offline"));
    assert!(snapshot.can_submit);
    assert_eq!(notifier.count(NoticeLevel::Error), 1);

    checkout.submit().await.unwrap();
    assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);

    let records = completer.records.lock().unwrap();
    assert_eq!(records.len(), 2);
    assert_ne!(records[0].id, records[1].id);
    assert_eq!(notifier.count(NoticeLevel::Success), 1);
}

#[tokio::test]
async fn concurrent_submit_is_rejected_while_processing() {
    let completer = Arc::new(GatedCompleter::default());
    let (checkout, _) = checkout_with(completer.clone());
    checkout.open(totals(1_000)).unwrap();

    let first = tokio::spawn({
        let checkout = checkout.clone();
        async move { checkout.submit().await }
    });
    wait_for_phase(&checkout, CheckoutPhase::Processing).await;

    assert!(matches!(checkout.submit().await, Err(CheckoutError::Busy)));
    assert!(matches!(checkout.close(), Err(CheckoutError::Busy)));
    assert!(matches!(
        checkout.select_method(PaymentMethod::Mobile),
        Err(CheckoutError::Busy)
    ));
    assert!(!checkout.snapshot().can_close);

    completer.gate.notify_one();
    first.await.unwrap().unwrap();

    assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn success_screen_auto_closes() {
    let (checkout, _) = checkout_with(Arc::new(ScriptedCompleter::default()));
    checkout.open(totals(500)).unwrap();
    checkout.submit().await.unwrap();

    tokio::time::sleep(Duration::from_millis(1_499)).await;
    assert_eq!(checkout.phase(), CheckoutPhase::Succeeded);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(checkout.phase(), CheckoutPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn auto_close_leaves_next_sale_alone() {
    let (checkout, _) = checkout_with(Arc::new(ScriptedCompleter::default()));
    checkout.open(totals(500)).unwrap();
    checkout.submit().await.unwrap();

    checkout.close().unwrap();
    checkout.open(totals(900)).unwrap();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(checkout.phase(), CheckoutPhase::Selecting);
    assert_eq!(checkout.snapshot().totals.total, Money::from_cents(900));
}
