//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Umbrella for everything below                  │
//! │  ├── DiscountError    - Discount evaluator rejections                  │
//! │  ├── CartError        - Cart line rule violations                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-checkout errors (separate crate)                                 │
//! │  └── CheckoutError    - Payment validation, completer failures         │
//! │                                                                         │
//! │  Every variant is user-correctable: shown inline, never fatal.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;
use crate::types::Percent;

// =============================================================================
// Core Error
// =============================================================================

/// Umbrella error for till-core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Discount Error
// =============================================================================

/// Why the discount evaluator refused a value.
///
/// ## User Workflow
/// ```text
/// Cashier types 60 (%) in the discount modal, cap is 50%
///      │
///      ▼
/// evaluate_discount(...)
///      │
///      ▼
/// ExceedsMaxPercent { max: 50% }
///      │
///      ▼
/// Modal shows "exceeds max percent (50%)" under the input
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscountError {
    #[error("value must be > 0")]
    NotPositive,

    #[error("exceeds max percent ({max})")]
    ExceedsMaxPercent { max: Percent },

    #[error("exceeds subtotal ({subtotal})")]
    ExceedsSubtotal { subtotal: Money },

    #[error("exceeds max amount ({max})")]
    ExceedsMaxAmount { max: Money },
}

// =============================================================================
// Cart Error
// =============================================================================

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Cart cannot have more than {max} lines")]
    TooManyLines { max: usize },

    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("SKU {0} is not in the cart")]
    LineNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
