//! # Checkout Demo
//!
//! Rings up a small order headless: cart, a 10% discount, cash paid in $20
//! bills, and a completer that logs the payment record.
//!
//! ## Usage
//! ```bash
//! cargo run -p till-checkout --bin checkout-demo
//! cargo run -p till-checkout --bin checkout-demo -- ./checkout.toml
//! RUST_LOG=till_checkout=debug cargo run -p till-checkout --bin checkout-demo
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::EnvFilter;

use till_checkout::{
    Checkout, CheckoutConfig, CompletionError, CurrentUser, OrderDraft, PaymentCompleter,
    PaymentRecord, Role, TracingNotifier,
};
use till_core::{DiscountValue, Money, Percent};

/// Stands in for the sale-recording backend.
struct LoggingCompleter;

#[async_trait]
impl PaymentCompleter for LoggingCompleter {
    async fn complete_payment(&self, record: &PaymentRecord) -> Result<(), CompletionError> {
        let json = serde_json::to_string_pretty(record).map_err(|e| CompletionError::new(e.to_string()))?;
        info!("Recording payment:\n{}", json);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting checkout demo...");

    let config = CheckoutConfig::load_or_default(std::env::args().nth(1).map(PathBuf::from));
    let money = config.currency.clone();
    let user = CurrentUser::new("cashier-001", "Demo Cashier", Role::Cashier);
    let notifier = Arc::new(TracingNotifier);

    // Build the order
    let mut order = OrderDraft::new(user.clone(), notifier.clone(), &config).on_apply(|discount| {
        if let Some(d) = discount {
            info!(amount = %d.amount(), reason = %d.reason, "Discount badge updated");
        }
    });
    order.add_item("COF-001", "Coffee beans 1kg", Money::from_cents(4_500), 2)?;
    order.add_item("MUG-002", "Ceramic mug", Money::from_cents(1_200), 5)?;
    order
        .apply_discount(DiscountValue::Percentage(Percent::from_bps(1_000)), "Loyalty card")
        .context("applying demo discount")?;

    let totals = order.totals();
    info!(
        subtotal = %money.format(totals.subtotal),
        discount = %money.format(totals.discount),
        tax = %money.format(totals.tax),
        total = %money.format(totals.total),
        "Order totals"
    );

    // Take payment
    let checkout = Checkout::new(user, Arc::new(LoggingCompleter), notifier, &config);
    checkout.open(totals)?;

    let suggestions: Vec<String> = checkout.quick_amounts().into_iter().map(|a| money.format(a)).collect();
    info!("Quick cash: {}", suggestions.join(", "));

    checkout.clear_tender()?;
    while checkout.snapshot().change.insufficient {
        checkout.add_denomination(Money::from_cents(2_000))?;
    }

    let record = checkout.submit().await?;
    info!(
        received = %money.format(record.received_amount),
        change = %money.format(record.change),
        "Sale complete"
    );

    tokio::time::sleep(config.success_close_delay() + std::time::Duration::from_millis(100)).await;
    info!(phase = %checkout.phase(), "Checkout demo finished");

    order.clear();
    Ok(())
}
