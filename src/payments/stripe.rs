use crate::config::GatewayConfig;
use crate::payments::error::{GatewayError, GatewayResult};
use crate::payments::gateway::{PaymentGateway, PaymentIntent, Refund};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// Stripe payment-intent adapter.
///
/// Speaks the form-encoded Stripe API with a bounded request timeout;
/// timeouts and connection failures surface as `GatewayUnavailable`-class
/// errors, never as business rejections.
pub struct StripeGateway {
    secret_key: String,
    base_url: String,
    timeout_secs: u64,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeRefundResponse {
    id: String,
    amount: i64,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(secret_key: String, config: &GatewayConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| GatewayError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            secret_key,
            base_url: config.base_url.clone(),
            timeout_secs: config.request_timeout,
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify_transport(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            GatewayError::Network {
                message: err.to_string(),
            }
        }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> GatewayResult<T> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("HTTP {status}"));

            return Err(GatewayError::Provider {
                message,
                status: Some(status.as_u16()),
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
    ) -> GatewayResult<PaymentIntent> {
        let form = [
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];

        let intent: StripeIntentResponse = self.post_form("/v1/payment_intents", &form).await?;

        info!(intent_id = %intent.id, amount_minor, currency, "Created payment intent");

        Ok(PaymentIntent {
            intent_id: intent.id,
            client_secret: intent.client_secret,
        })
    }

    async fn refund(&self, intent_id: &str, amount_minor: i64) -> GatewayResult<Refund> {
        let form = [
            ("payment_intent", intent_id.to_string()),
            ("amount", amount_minor.to_string()),
        ];

        let refund: StripeRefundResponse = self.post_form("/v1/refunds", &form).await?;

        info!(refund_id = %refund.id, intent_id, amount_minor, "Issued refund");

        Ok(Refund {
            refund_id: refund.id,
            amount_minor: refund.amount,
        })
    }

    fn name(&self) -> &'static str {
        "stripe"
    }
}
