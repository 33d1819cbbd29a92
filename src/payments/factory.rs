use crate::config::GatewayConfig;
use crate::payments::error::GatewayResult;
use crate::payments::gateway::{DisabledGateway, PaymentGateway};
use crate::payments::stripe::StripeGateway;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the payment gateway from configuration.
///
/// Missing credentials are detected here, at startup, and wired as a
/// disabled gateway so the service still boots; the first payment attempt
/// then fails with a not-configured error instead of a crash.
pub fn gateway_from_config(config: &GatewayConfig) -> GatewayResult<Arc<dyn PaymentGateway>> {
    match &config.secret_key {
        Some(secret_key) => {
            let gateway = StripeGateway::new(secret_key.clone(), config)?;
            info!(base_url = %config.base_url, "Payment gateway configured: stripe");
            Ok(Arc::new(gateway))
        }
        None => {
            warn!("STRIPE_SECRET_KEY not set; payment gateway disabled");
            Ok(Arc::new(DisabledGateway))
        }
    }
}
