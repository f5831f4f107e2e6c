//! Payment configuration

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    #[serde(default = "empty_secret")]
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    #[serde(default = "empty_secret")]
    pub stripe_webhook_secret: SecretString,

    /// Stripe REST API base URL
    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// Stripe price ID for the `monthly` plan
    pub stripe_monthly_price_id: Option<String>,

    /// Stripe price ID for the `annual` plan
    pub stripe_annual_price_id: Option<String>,

    /// Additional plans as `plan=price_id` pairs, comma-separated
    pub stripe_price_ids: Option<String>,

    /// Plan used when a checkout request names none
    #[serde(default = "default_plan")]
    pub default_plan: String,

    /// Redirect after a completed checkout
    #[serde(default)]
    pub success_url: String,

    /// Redirect after an abandoned checkout
    #[serde(default)]
    pub cancel_url: String,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Plan key to price ID.
    ///
    /// The dedicated monthly/annual settings seed the table and entries in
    /// `stripe_price_ids` override them. Keys are lower-cased; blank values
    /// are left out.
    pub fn price_table(&self) -> HashMap<String, String> {
        let mut table = HashMap::new();

        let dedicated = [
            ("monthly", &self.stripe_monthly_price_id),
            ("annual", &self.stripe_annual_price_id),
        ];
        for (plan, price) in dedicated {
            if let Some(price) = price.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                table.insert(plan.to_string(), price.to_string());
            }
        }

        for (plan, price) in self.extra_prices().into_iter().flatten() {
            table.insert(plan, price);
        }

        table
    }

    /// Parsed `stripe_price_ids` entries, or the first malformed entry.
    fn extra_prices(&self) -> Result<Vec<(String, String)>, ValidationError> {
        let Some(raw) = self.stripe_price_ids.as_deref() else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (plan, price) = entry
                    .split_once('=')
                    .ok_or_else(|| ValidationError::InvalidPriceTable(entry.to_string()))?;
                let (plan, price) = (plan.trim().to_lowercase(), price.trim().to_string());
                if plan.is_empty() || price.is_empty() {
                    return Err(ValidationError::InvalidPriceTable(entry.to_string()));
                }
                Ok((plan, price))
            })
            .collect()
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !is_http_url(&self.stripe_api_base_url) {
            return Err(ValidationError::InvalidStripeBaseUrl);
        }
        if self.default_plan.trim().is_empty() {
            return Err(ValidationError::MissingRequired("DEFAULT_PLAN"));
        }
        if !is_http_url(&self.success_url) {
            return Err(ValidationError::InvalidRedirectUrl("success_url"));
        }
        if !is_http_url(&self.cancel_url) {
            return Err(ValidationError::InvalidRedirectUrl("cancel_url"));
        }

        self.extra_prices()?;

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: empty_secret(),
            stripe_webhook_secret: empty_secret(),
            stripe_api_base_url: default_api_base_url(),
            stripe_monthly_price_id: None,
            stripe_annual_price_id: None,
            stripe_price_ids: None,
            default_plan: default_plan(),
            success_url: String::new(),
            cancel_url: String::new(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_plan() -> String {
    "monthly".to_string()
}
