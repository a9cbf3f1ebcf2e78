//! # Order Draft
//!
//! The order being rung up: cart lines, an optional discount and the tax
//! rate. Totals are always recomputed from those three, never stored.
//!
//! ## Discount Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_discount ──► evaluate ──ok──► stamp reason/author ──► on_apply(Some)
//! │                         │                                               │
//! │                         └──err──► Notice::error, discount unchanged     │
//! │                                                                         │
//! │  cart change ──► reprice ──ok──► on_apply(Some) if the amount moved     │
//! │                      │                                                  │
//! │                      └──err──► discount dropped, Notice::warning,       │
//! │                                on_apply(None)                           │
//! │                                                                         │
//! │  remove_discount / clear ──► on_apply(None)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use till_core::{
    compute_totals, evaluate_discount, Cart, Discount, DiscountPolicy, DiscountValue, Money,
    OrderTotals, TaxRate,
};

use crate::config::{CheckoutConfig, CurrencyFormat};
use crate::error::CheckoutResult;
use crate::notify::{CurrentUser, Notice, Notifier};

/// Called whenever the applied discount changes.
pub type DiscountCallback = Box<dyn FnMut(Option<&Discount>) + Send>;

pub struct OrderDraft {
    cart: Cart,
    discount: Option<Discount>,
    tax_rate: TaxRate,
    policy: DiscountPolicy,
    currency: CurrencyFormat,
    user: CurrentUser,
    notifier: Arc<dyn Notifier>,
    on_apply: Option<DiscountCallback>,
}

impl fmt::Debug for OrderDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderDraft")
            .field("cart", &self.cart)
            .field("discount", &self.discount)
            .field("tax_rate", &self.tax_rate)
            .field("user", &self.user.id)
            .finish_non_exhaustive()
    }
}

impl OrderDraft {
    pub fn new(user: CurrentUser, notifier: Arc<dyn Notifier>, config: &CheckoutConfig) -> Self {
        OrderDraft {
            cart: Cart::new(),
            discount: None,
            tax_rate: config.tax_rate(),
            policy: config.discount_policy(),
            currency: config.currency.clone(),
            user,
            notifier,
            on_apply: None,
        }
    }

    /// Registers the discount-change callback.
    pub fn on_apply(mut self, callback: impl FnMut(Option<&Discount>) + Send + 'static) -> Self {
        self.on_apply = Some(Box::new(callback));
        self
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    pub fn totals(&self) -> OrderTotals {
        compute_totals(self.cart.subtotal(), self.discount.as_ref(), self.tax_rate)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_item(&mut self, sku: &str, name: &str, unit_price: Money, quantity: i64) -> CheckoutResult<()> {
        self.cart.add(sku, name, unit_price, quantity)?;
        self.reprice_discount();
        Ok(())
    }

    pub fn set_quantity(&mut self, sku: &str, quantity: i64) -> CheckoutResult<()> {
        self.cart.set_quantity(sku, quantity)?;
        self.reprice_discount();
        Ok(())
    }

    pub fn remove_item(&mut self, sku: &str) -> CheckoutResult<()> {
        self.cart.remove(sku)?;
        self.reprice_discount();
        Ok(())
    }

    /// Empties the cart and drops any discount. Used after a completed sale.
    pub fn clear(&mut self) {
        self.cart.clear();
        if self.discount.take().is_some() {
            self.fire_on_apply();
        }
    }

    // =========================================================================
    // Discount
    // =========================================================================

    /// Evaluates and applies a discount, replacing any existing one.
    ///
    /// Failures are raised through the notifier and returned; the current
    /// discount is left untouched.
    pub fn apply_discount(&mut self, value: DiscountValue, reason: &str) -> CheckoutResult<Discount> {
        let subtotal = self.cart.subtotal();

        let discount = evaluate_discount(subtotal, value, &self.policy)
            .map_err(|e| {
                debug!(error = %e, "Discount rejected");
                self.notifier.notify(Notice::error(format!("Invalid discount: {e}")));
                e
            })?
            .into_discount(reason, Utc::now())
            .map_err(|e| {
                self.notifier.notify(Notice::error(format!("Invalid discount reason: {e}")));
                e
            })?
            .with_author(self.user.id.clone());

        info!(
            user_id = %self.user.id,
            amount = %discount.amount(),
            requires_approval = discount.requires_approval,
            "Discount applied"
        );

        if discount.requires_approval && !self.user.can_approve_discounts() {
            self.notifier.notify(Notice::warning(format!(
                "Discount of {} requires manager approval",
                self.currency.format(discount.amount())
            )));
        } else {
            self.notifier.notify(Notice::success(format!(
                "Discount applied: {}",
                self.currency.format(discount.amount())
            )));
        }

        self.discount = Some(discount.clone());
        self.fire_on_apply();
        Ok(discount)
    }

    pub fn remove_discount(&mut self) {
        if self.discount.take().is_some() {
            info!(user_id = %self.user.id, "Discount removed");
        }
        self.fire_on_apply();
    }

    fn reprice_discount(&mut self) {
        let Some(current) = self.discount.as_ref() else {
            return;
        };

        match current.reprice(self.cart.subtotal(), &self.policy) {
            Ok(repriced) => {
                if repriced != *current {
                    debug!(amount = %repriced.amount(), "Discount repriced");
                    self.discount = Some(repriced);
                    self.fire_on_apply();
                }
            }
            Err(e) => {
                warn!(error = %e, "Discount no longer valid for cart, removing");
                self.notifier.notify(Notice::warning(format!("Discount removed: {e}")));
                self.discount = None;
                self.fire_on_apply();
            }
        }
    }

    fn fire_on_apply(&mut self) {
        if let Some(on_apply) = self.on_apply.as_mut() {
            on_apply(self.discount.as_ref());
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckoutError;
    use crate::notify::{NoticeLevel, Role};
    use std::sync::Mutex;
    use till_core::{DiscountError, Percent};

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
        fn levels(&self) -> Vec<NoticeLevel> {
            self.notices.lock().unwrap().iter().map(|n| n.level).collect()
        }
    }

    fn draft(role: Role) -> (OrderDraft, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let user = CurrentUser::new("u-1", "Ana", role);
        let mut draft = OrderDraft::new(user, notifier.clone(), &CheckoutConfig::default());
        draft
            .add_item("SKU-1", "Coffee beans", Money::from_cents(5_000), 3)
            .unwrap();
        (draft, notifier)
    }

    fn pct(bps: u32) -> DiscountValue {
        DiscountValue::Percentage(Percent::from_bps(bps))
    }

    #[test]
    fn test_ten_percent_on_150() {
        let (mut draft, _) = draft(Role::Cashier);
        let discount = draft.apply_discount(pct(1_000), "loyalty").unwrap();

        assert_eq!(discount.amount(), Money::from_cents(1_500));
        assert_eq!(discount.applied_by.as_deref(), Some("u-1"));

        let totals = draft.totals();
        assert_eq!(totals.subtotal, Money::from_cents(15_000));
        assert_eq!(totals.discount, Money::from_cents(1_500));
        assert_eq!(totals.total, Money::from_cents(13_500));
    }

    #[test]
    fn test_callback_sees_apply_and_remove() {
        let seen: Arc<Mutex<Vec<Option<Money>>>> = Arc::default();
        let (draft, _) = draft(Role::Cashier);
        let sink = seen.clone();
        let mut draft = draft.on_apply(move |d| sink.lock().unwrap().push(d.map(|d| d.amount())));

        draft.apply_discount(pct(1_000), "").unwrap();
        draft.remove_discount();

        assert_eq!(*seen.lock().unwrap(), vec![Some(Money::from_cents(1_500)), None]);
        assert!(draft.discount().is_none());
    }

    #[test]
    fn test_rejection_is_notified_and_keeps_current() {
        let (mut draft, notifier) = draft(Role::Cashier);
        draft.apply_discount(pct(1_000), "").unwrap();

        let err = draft.apply_discount(pct(6_000), "").unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Discount(DiscountError::ExceedsMaxPercent { .. })
        ));
        assert_eq!(draft.discount().map(|d| d.amount()), Some(Money::from_cents(1_500)));
        assert_eq!(notifier.levels().last(), Some(&NoticeLevel::Error));
    }

    #[test]
    fn test_approval_warning_depends_on_role() {
        let (mut cashier, notifier) = draft(Role::Cashier);
        let discount = cashier.apply_discount(pct(3_000), "").unwrap();
        assert!(discount.requires_approval);
        assert_eq!(notifier.levels(), vec![NoticeLevel::Warning]);

        let (mut manager, notifier) = draft(Role::Manager);
        manager.apply_discount(pct(3_000), "").unwrap();
        assert_eq!(notifier.levels(), vec![NoticeLevel::Success]);
    }

    #[test]
    fn test_percentage_follows_cart() {
        let (mut draft, _) = draft(Role::Cashier);
        draft.apply_discount(pct(1_000), "").unwrap();

        draft.set_quantity("SKU-1", 1).unwrap();
        assert_eq!(draft.totals().discount, Money::from_cents(500));
    }

    #[test]
    fn test_fixed_dropped_when_cart_shrinks() {
        let (mut draft, notifier) = draft(Role::Manager);
        draft
            .apply_discount(DiscountValue::Fixed(Money::from_cents(6_000)), "damaged box")
            .unwrap();

        draft.set_quantity("SKU-1", 1).unwrap();
        assert!(draft.discount().is_none());
        assert_eq!(draft.totals().total, Money::from_cents(5_000));
        assert_eq!(notifier.levels().last(), Some(&NoticeLevel::Warning));
    }

    #[test]
    fn test_clear_drops_discount() {
        let (mut draft, _) = draft(Role::Cashier);
        draft.apply_discount(pct(500), "").unwrap();
        draft.clear();
        assert!(draft.cart().is_empty());
        assert!(draft.discount().is_none());
        assert_eq!(draft.totals().total, Money::zero());
    }
}
