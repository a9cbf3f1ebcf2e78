//! # till-core: Pure Checkout Logic for Till
//!
//! This crate holds the arithmetic behind the checkout screen as pure
//! functions and small value types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (checkout UI)                       │   │
//! │  │    Cart ──► Discount modal ──► Payment modal ──► Receipt        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                till-checkout (orchestration)                    │   │
//! │  │    PaymentSession, Checkout, OrderDraft, Notifier               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  money   │ │ discount │ │  tender  │ │  totals  │          │   │
//! │  │   │  Money   │ │ evaluate │ │ CashTend │ │ OrderTot │          │   │
//! │  │   │ Percent  │ │  Policy  │ │  change  │ │  compose │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • PURE FUNCTIONS                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Rates, payment methods, payment details
//! - [`discount`] - Discount evaluator and approval policy
//! - [`tender`] - Cash tender / change calculator
//! - [`totals`] - Order total composition
//! - [`cart`] - Cart lines feeding the subtotal
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{evaluate_discount, DiscountPolicy, DiscountValue, Money, Percent};
//!
//! let subtotal = Money::from_cents(15_000); // $150.00
//! let value = DiscountValue::Percentage(Percent::from_bps(1000)); // 10%
//!
//! let quote = evaluate_discount(subtotal, value, &DiscountPolicy::default()).unwrap();
//! assert_eq!(quote.amount.cents(), 1_500);
//! ```

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod tender;
pub mod totals;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine};
pub use discount::{evaluate_discount, ApprovalPolicy, Discount, DiscountPolicy, DiscountQuote, DiscountValue};
pub use error::{CartError, CoreError, DiscountError, ValidationError};
pub use money::Money;
pub use tender::{quick_amounts, CashTender, ChangeSummary};
pub use totals::{compute_totals, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches typing 1000 instead of 10 at the register.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum length of a discount reason.
pub const MAX_DISCOUNT_REASON_LEN: usize = 200;
