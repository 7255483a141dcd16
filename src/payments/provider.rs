use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config;

/// Order reference handed back by the payment provider. The id is
/// provider-assigned and globally unique; the client opens the hosted
/// checkout against it.
#[derive(Debug, Clone)]
pub struct ProviderOrder {
    pub order_id: String,
    pub amount_minor: i64,
    pub currency: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider unreachable, timed out, or rejected the request. The caller
    /// should create a fresh order rather than retry this one.
    #[error("{0}")]
    Unavailable(String),
}

/// Seam between the order issuer and the concrete payment provider, so tests
/// can substitute a stub without touching the network.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<ProviderOrder, ProviderError>;
}

pub struct RazorpayProvider {
    base: String,
    key_id: String,
    key_secret: String,
    client: Client,
}

impl RazorpayProvider {
    pub fn from_env() -> Self {
        Self::new(
            config::RAZORPAY_API_BASE.clone(),
            config::RAZORPAY_KEY_ID.clone(),
            config::RAZORPAY_KEY_SECRET.clone(),
        )
    }

    pub fn new(
        base: impl Into<String>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(*config::PROVIDER_TIMEOUT_SECS))
                .build()
                .expect("client build"),
        }
    }
}

#[derive(Deserialize)]
struct RazorpayOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[async_trait]
impl PaymentProvider for RazorpayProvider {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<ProviderOrder, ProviderError> {
        let url = format!("{}/v1/orders", self.base);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": amount_minor,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let order: RazorpayOrderResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(ProviderOrder {
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }
}
