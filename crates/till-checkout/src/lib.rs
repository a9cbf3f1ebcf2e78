//! # till-checkout: Checkout Orchestration for Till
//!
//! Everything between "the cart is ready" and "the sale is recorded":
//! discount application, the payment modal state machine and the hand-off to
//! the external payment completer.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   OrderDraft ──totals()──► Checkout::open ──► PaymentSession            │
//! │   (cart + discount)                              │                      │
//! │        │                                         │ submit               │
//! │        │ on_apply(Option<&Discount>)             ▼                      │
//! │        ▼                                   PaymentRecord                │
//! │   UI discount badge                              │                      │
//! │                                                  ▼                      │
//! │                               PaymentCompleter::complete_payment        │
//! │                                                  │                      │
//! │                          Notifier ◄── success / failure notice          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Payment modal state machine (synchronous)
//! - [`checkout`] - Async wrapper driving the completer
//! - [`order`] - Order draft with discount application
//! - [`notify`] - Notifier and current-user capabilities
//! - [`debounce`] - Cancellable debouncer for search input
//! - [`config`] - Checkout configuration (file + environment)
//! - [`error`] - Checkout error types

pub mod checkout;
pub mod config;
pub mod debounce;
pub mod error;
pub mod notify;
pub mod order;
pub mod session;

pub use checkout::{Checkout, PaymentCompleter};
pub use config::{CheckoutConfig, CurrencyFormat, DiscountSettings};
pub use debounce::Debouncer;
pub use error::{CheckoutError, CheckoutResult, CompletionError, ConfigError, PaymentValidationError};
pub use notify::{CurrentUser, Notice, NoticeLevel, NoticeStyle, Notifier, Role, TracingNotifier};
pub use order::{DiscountCallback, OrderDraft};
pub use session::{CheckoutPhase, PaymentRecord, PaymentSession, SessionSnapshot};
