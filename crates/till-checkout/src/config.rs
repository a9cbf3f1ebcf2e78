//! # Checkout Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TILL_CURRENCY_SYMBOL=€                                             │
//! │     TILL_TAX_RATE=8.25                                                 │
//! │     TILL_MAX_DISCOUNT_PERCENT=30                                       │
//! │     TILL_MAX_DISCOUNT_AMOUNT=50.00                                     │
//! │     TILL_DISCOUNT_APPROVAL=false                                       │
//! │     TILL_SUCCESS_CLOSE_DELAY_MS=1500                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/till/checkout.toml (Linux)                               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! tax_rate_bps = 825
//! denominations_cents = [100, 500, 1000, 2000, 5000, 10000]
//! success_close_delay_ms = 1500
//!
//! [currency]
//! symbol = "$"
//! decimals = 2
//!
//! [discount]
//! max_percent = 50.0
//! max_amount_cents = 5000
//! approval_enabled = true
//! approval_percent_ratio = 50.0
//! approval_fixed_ratio = 30.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use till_core::validation::{validate_denomination_cents, validate_tax_rate_bps};
use till_core::{ApprovalPolicy, DiscountPolicy, Money, Percent, TaxRate};

use crate::error::ConfigError;

// =============================================================================
// Currency Format
// =============================================================================

/// How amounts are rendered in the checkout UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    /// Fraction digits. Every amount in the till (prices, denominations,
    /// keypad input) is held in minor units of this many digits.
    pub decimals: u8,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 2,
        }
    }
}

impl CurrencyFormat {
    /// Formats a cent amount, e.g. `1234` → `"$12.34"`.
    pub fn format(&self, amount: Money) -> String {
        let cents = amount.cents();
        let divisor = 10_i64.pow(self.decimals as u32);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if self.decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.symbol,
                whole,
                frac,
                width = self.decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.symbol, whole)
        }
    }
}

// =============================================================================
// Discount Settings
// =============================================================================

/// Discount limits as written by a store owner (plain percentages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscountSettings {
    pub max_percent: f64,
    pub max_amount_cents: Option<i64>,
    pub approval_enabled: bool,
    /// Share of `max_percent` above which a percentage discount needs approval.
    pub approval_percent_ratio: f64,
    /// Share of the subtotal above which a fixed discount needs approval.
    pub approval_fixed_ratio: f64,
}

impl Default for DiscountSettings {
    fn default() -> Self {
        DiscountSettings {
            max_percent: 50.0,
            max_amount_cents: None,
            approval_enabled: true,
            approval_percent_ratio: 50.0,
            approval_fixed_ratio: 30.0,
        }
    }
}

impl DiscountSettings {
    pub fn policy(&self) -> DiscountPolicy {
        DiscountPolicy {
            max_percent: Percent::from_percentage(self.max_percent),
            max_amount: self.max_amount_cents.map(Money::from_cents),
            approval: ApprovalPolicy {
                enabled: self.approval_enabled,
                percent_ratio: Percent::from_percentage(self.approval_percent_ratio),
                fixed_ratio: Percent::from_percentage(self.approval_fixed_ratio),
            },
        }
    }
}

// =============================================================================
// Checkout Config
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub currency: CurrencyFormat,
    pub tax_rate_bps: u32,
    pub discount: DiscountSettings,
    /// Quick-cash buttons on the payment modal.
    pub denominations_cents: Vec<i64>,
    /// How long the success screen stays up before the modal closes.
    pub success_close_delay_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            currency: CurrencyFormat::default(),
            tax_rate_bps: 0,
            discount: DiscountSettings::default(),
            denominations_cents: vec![100, 500, 1_000, 2_000, 5_000, 10_000],
            success_close_delay_ms: 1_500,
        }
    }
}

impl CheckoutConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (checkout.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_tax_rate_bps(self.tax_rate_bps).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.currency.decimals > 4 {
            return Err(ConfigError::Invalid(format!(
                "currency.decimals must be at most 4, got {}",
                self.currency.decimals
            )));
        }

        for cents in &self.denominations_cents {
            validate_denomination_cents(*cents).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        let max_percent = self.discount.max_percent;
        if !(max_percent > 0.0 && max_percent <= 100.0) {
            return Err(ConfigError::Invalid(format!(
                "discount.max_percent must be in (0, 100], got {}",
                max_percent
            )));
        }

        if matches!(self.discount.max_amount_cents, Some(c) if c <= 0) {
            return Err(ConfigError::Invalid(
                "discount.max_amount_cents must be greater than 0".into(),
            ));
        }

        for (name, ratio) in [
            ("approval_percent_ratio", self.discount.approval_percent_ratio),
            ("approval_fixed_ratio", self.discount.approval_fixed_ratio),
        ] {
            if !(0.0..=100.0).contains(&ratio) {
                return Err(ConfigError::Invalid(format!(
                    "discount.{} must be in [0, 100], got {}",
                    name, ratio
                )));
            }
        }

        Ok(())
    }

    /// Applies `TILL_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("TILL_CURRENCY_SYMBOL") {
            self.currency.symbol = symbol;
        }

        if let Some(rate) = lookup("TILL_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(pct) => {
                    debug!(rate = pct, "Overriding tax rate from environment");
                    self.tax_rate_bps = TaxRate::from_percentage(pct).bps();
                }
                Err(_) => warn!(value = %rate, "Ignoring invalid TILL_TAX_RATE"),
            }
        }

        if let Some(max) = lookup("TILL_MAX_DISCOUNT_PERCENT") {
            match max.parse::<f64>() {
                Ok(pct) => self.discount.max_percent = pct,
                Err(_) => warn!(value = %max, "Ignoring invalid TILL_MAX_DISCOUNT_PERCENT"),
            }
        }

        if let Some(max) = lookup("TILL_MAX_DISCOUNT_AMOUNT") {
            match Money::parse_scaled(&max, self.currency.decimals) {
                Some(amount) => self.discount.max_amount_cents = Some(amount.cents()),
                None => warn!(value = %max, "Ignoring invalid TILL_MAX_DISCOUNT_AMOUNT"),
            }
        }

        if let Some(flag) = lookup("TILL_DISCOUNT_APPROVAL") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.discount.approval_enabled = true,
                "0" | "false" | "no" | "off" => self.discount.approval_enabled = false,
                _ => warn!(value = %flag, "Ignoring invalid TILL_DISCOUNT_APPROVAL"),
            }
        }

        if let Some(delay) = lookup("TILL_SUCCESS_CLOSE_DELAY_MS") {
            match delay.parse::<u64>() {
                Ok(ms) => self.success_close_delay_ms = ms,
                Err(_) => warn!(value = %delay, "Ignoring invalid TILL_SUCCESS_CLOSE_DELAY_MS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "till", "till")
            .map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    pub fn discount_policy(&self) -> DiscountPolicy {
        self.discount.policy()
    }

    pub fn denominations(&self) -> Vec<Money> {
        self.denominations_cents.iter().copied().map(Money::from_cents).collect()
    }

    pub fn success_close_delay(&self) -> Duration {
        Duration::from_millis(self.success_close_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.success_close_delay(), Duration::from_millis(1_500));

        let policy = config.discount_policy();
        assert_eq!(policy.max_percent, Percent::from_bps(5_000));
        assert_eq!(policy.approval.percent_ratio, Percent::from_bps(5_000));
        assert_eq!(policy.approval.fixed_ratio, Percent::from_bps(3_000));
    }

    #[test]
    fn test_format_currency() {
        let format = CurrencyFormat::default();
        assert_eq!(format.format(Money::from_cents(1234)), "$12.34");
        assert_eq!(format.format(Money::from_cents(5)), "$0.05");
        assert_eq!(format.format(Money::from_cents(-1234)), "-$12.34");

        let yen = CurrencyFormat { symbol: "¥".to_string(), decimals: 0 };
        assert_eq!(yen.format(Money::from_cents(1500)), "¥1500");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CheckoutConfig::from_toml_str(
            r#"
            tax_rate_bps = 825

            [discount]
            max_percent = 30.0
            max_amount_cents = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.tax_rate(), TaxRate::from_bps(825));
        assert_eq!(config.discount.max_percent, 30.0);
        assert!(config.discount.approval_enabled);
        assert_eq!(config.currency.symbol, "$");
        assert_eq!(config.discount_policy().max_amount, Some(Money::from_cents(5_000)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TILL_CURRENCY_SYMBOL", "€"),
            ("TILL_TAX_RATE", "8.25"),
            ("TILL_MAX_DISCOUNT_AMOUNT", "25.50"),
            ("TILL_DISCOUNT_APPROVAL", "off"),
            ("TILL_SUCCESS_CLOSE_DELAY_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = CheckoutConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.currency.symbol, "€");
        assert_eq!(config.tax_rate_bps, 825);
        assert_eq!(config.discount.max_amount_cents, Some(2_550));
        assert!(!config.discount.approval_enabled);
        assert_eq!(config.success_close_delay_ms, 1_500);
    }

    #[test]
    fn test_env_discount_cap_uses_currency_decimals() {
        let mut config = CheckoutConfig::default();
        config.currency.decimals = 0;
        config.apply_env_overrides(|key| {
            (key == "TILL_MAX_DISCOUNT_AMOUNT").then(|| "5,000".to_string())
        });
        assert_eq!(config.discount.max_amount_cents, Some(5_000));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CheckoutConfig::default();
        config.discount.max_percent = 120.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = CheckoutConfig::default();
        config.denominations_cents.push(0);
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::default();
        config.tax_rate_bps = 20_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("till-checkout-does-not-exist.toml");
        let config = CheckoutConfig::load_or_default(Some(path));
        assert_eq!(config.denominations().len(), 6);
    }

    #[test]
    fn test_from_file_reports_io_error() {
        let path = std::env::temp_dir().join("till-checkout-missing-dir/checkout.toml");
        assert!(matches!(CheckoutConfig::from_file(&path), Err(ConfigError::Io { .. })));
    }
}
