//! Stripe payment intents over the REST API

use async_trait::async_trait;
use serde::Deserialize;

use super::{PaymentGateway, PaymentIntent};
use crate::config::PaymentConfig;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
    currency: String,
}

impl StripeGateway {
    pub fn new(client: reqwest::Client, config: &PaymentConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            currency: config.currency.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(&self, amount: i64) -> Result<PaymentIntent> {
        let url = format!("{}/v1/payment_intents", self.api_base);
        let form = [
            ("amount", amount.to_string()),
            ("currency", self.currency.clone()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body
                    .error
                    .message
                    .or(body.error.code)
                    .unwrap_or_else(|| status.to_string()),
                Err(_) => status.to_string(),
            };
            tracing::error!("Payment intent creation failed: {}", message);
            return Err(Error::Payment(message));
        }

        let intent: IntentResponse = response.json().await?;
        tracing::info!("Created payment intent {} for {} {}", intent.id, intent.amount, intent.currency);
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            amount: intent.amount,
            currency: intent.currency,
        })
    }
}
