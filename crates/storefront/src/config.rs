//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults match the production storefront.
//!
//! - `ATELIER_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is
//!   free (default: 5000)
//! - `ATELIER_FLAT_SHIPPING_FEE` - Flat fee below the threshold
//!   (default: 499)
//! - `ATELIER_PAYMENT_METHODS` - Comma-separated payment methods accepted
//!   at checkout (default: `cod`). Methods outside this set validate but
//!   fail submission with `UnsupportedPaymentMethod`.
//!
//! There is exactly one shipping configuration. Every surface that shows
//! a total (cart preview, checkout summary) prices against the same
//! values, so the two can never disagree.

use std::str::FromStr;

use thiserror::Error;

use atelier_core::{Money, PaymentMethodKind};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront engine configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Shipping fee schedule shared by every pricing call site.
    pub pricing: PricingConfig,
    /// Checkout policy (accepted payment methods).
    pub checkout: CheckoutConfig,
}

/// Shipping fee schedule.
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    /// Orders with a subtotal strictly above this ship free.
    pub free_shipping_threshold: Money,
    /// Flat shipping fee below the threshold.
    pub flat_shipping_fee: Money,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_major(5000),
            flat_shipping_fee: Money::from_major(499),
        }
    }
}

/// Checkout policy.
///
/// Card and UPI inputs are always validated, but only methods listed
/// here complete order creation. The production rollout currently
/// accepts cash-on-delivery only.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub enabled_payment_methods: Vec<PaymentMethodKind>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            enabled_payment_methods: vec![PaymentMethodKind::CashOnDelivery],
        }
    }
}

impl CheckoutConfig {
    /// Whether a payment method is accepted for order creation.
    #[must_use]
    pub fn accepts(&self, method: PaymentMethodKind) -> bool {
        self.enabled_payment_methods.contains(&method)
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let free_shipping_threshold = get_money_or(
            "ATELIER_FREE_SHIPPING_THRESHOLD",
            PricingConfig::default().free_shipping_threshold,
        )?;
        let flat_shipping_fee = get_money_or(
            "ATELIER_FLAT_SHIPPING_FEE",
            PricingConfig::default().flat_shipping_fee,
        )?;
        let enabled_payment_methods = get_payment_methods("ATELIER_PAYMENT_METHODS")?;

        Ok(Self {
            pricing: PricingConfig {
                free_shipping_threshold,
                flat_shipping_fee,
            },
            checkout: CheckoutConfig {
                enabled_payment_methods,
            },
        })
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            checkout: CheckoutConfig::default(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a whole-unit money amount from the environment, with a default.
fn get_money_or(key: &str, default: Money) -> Result<Money, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse::<i64>()
            .map(Money::from_major)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
    }
}

/// Parse a comma-separated payment method list from the environment.
fn get_payment_methods(key: &str) -> Result<Vec<PaymentMethodKind>, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(CheckoutConfig::default().enabled_payment_methods),
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                PaymentMethodKind::from_str(s)
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
            })
            .collect(),
    }
}
