use crate::payments::error::{GatewayError, GatewayResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A payment intent created with the external provider.
///
/// `client_secret` is handed to the caller so the charge can be completed
/// out-of-band; `intent_id` is the handle the backend keys the order on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: String,
}

/// A refund issued against a previously confirmed intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub refund_id: String,
    pub amount_minor: i64,
}

/// External payment-intent provider.
///
/// The adapter only relays provider signals; business state transitions
/// live in the order lifecycle and dispute services.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for the given amount in minor units.
    async fn create_intent(&self, amount_minor: i64, currency: &str)
        -> GatewayResult<PaymentIntent>;

    /// Refund part or all of a confirmed intent.
    async fn refund(&self, intent_id: &str, amount_minor: i64) -> GatewayResult<Refund>;

    fn name(&self) -> &'static str;
}

/// Stand-in wired by the factory when no provider credentials exist.
/// Every call fails with `NotConfigured`; startup itself never fails.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_intent(
        &self,
        _amount_minor: i64,
        _currency: &str,
    ) -> GatewayResult<PaymentIntent> {
        Err(GatewayError::NotConfigured)
    }

    async fn refund(&self, _intent_id: &str, _amount_minor: i64) -> GatewayResult<Refund> {
        Err(GatewayError::NotConfigured)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
