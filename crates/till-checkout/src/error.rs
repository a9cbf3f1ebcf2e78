//! # Checkout Errors
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Validation (shown inline, state returns to Selecting)                  │
//! │  ├── PaymentValidationError::InsufficientAmount                         │
//! │  ├── PaymentValidationError::MissingCardDetails                         │
//! │  └── DiscountError (from till-core)                                     │
//! │                                                                         │
//! │  External (dismissible banner, state returns to Selecting)              │
//! │  └── CheckoutError::External  ◄── PaymentCompleter rejected             │
//! │                                                                         │
//! │  Flow control                                                           │
//! │  ├── CheckoutError::Busy          ◄── a payment is in flight            │
//! │  └── CheckoutError::InvalidState  ◄── action not valid in this phase    │
//! │                                                                         │
//! │  No variant is fatal: the cashier can always correct and resubmit.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;
use till_core::{CartError, DiscountError, Money, ValidationError};

use crate::session::CheckoutPhase;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Payment rejected before reaching the completer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentValidationError {
    #[error("Insufficient amount: received {received}, total {total}, short by {shortfall}")]
    InsufficientAmount {
        total: Money,
        received: Money,
        shortfall: Money,
    },

    #[error("Card details are required for card payments")]
    MissingCardDetails,
}

/// Failure reported by the external payment completer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompletionError {
    pub message: String,
}

impl CompletionError {
    pub fn new(message: impl Into<String>) -> Self {
        CompletionError {
            message: message.into(),
        }
    }
}

impl From<String> for CompletionError {
    fn from(message: String) -> Self {
        CompletionError { message }
    }
}

impl From<&str> for CompletionError {
    fn from(message: &str) -> Self {
        CompletionError::new(message)
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] PaymentValidationError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Input(#[from] ValidationError),

    /// The completer rejected the payment; the message is shown as-is.
    #[error("{message}")]
    External { message: String },

    #[error("A payment is already being processed")]
    Busy,

    #[error("Cannot {action} while checkout is {phase}")]
    InvalidState {
        phase: CheckoutPhase,
        action: &'static str,
    },
}

impl CheckoutError {
    /// True for errors that belong inline next to the input that caused them.
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            CheckoutError::Validation(_) | CheckoutError::Discount(_) | CheckoutError::Input(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_amount_message() {
        let err = PaymentValidationError::InsufficientAmount {
            total: Money::from_cents(10_000),
            received: Money::from_cents(8_000),
            shortfall: Money::from_cents(2_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient amount: received $80.00, total $100.00, short by $20.00"
        );
    }

    #[test]
    fn test_external_error_shows_completer_message() {
        let err = CheckoutError::External {
            message: CompletionError::from("Terminal offline").to_string(),
        };
        assert_eq!(err.to_string(), "Terminal offline");
        assert!(!err.is_inline());
    }

    #[test]
    fn test_invalid_state_message() {
        let err = CheckoutError::InvalidState {
            phase: CheckoutPhase::Idle,
            action: "submit",
        };
        assert_eq!(err.to_string(), "Cannot submit while checkout is idle");
    }
}
