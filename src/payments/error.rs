use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failures talking to the external payment provider.
///
/// These are transport/configuration problems, never business rejections:
/// the adapter relays signals, it does not decide order state.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Payment gateway is not configured")]
    NotConfigured,

    #[error("Payment gateway request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Payment gateway network error: {message}")]
    Network { message: String },

    #[error("Payment gateway rejected the request: {message}")]
    Provider {
        message: String,
        status: Option<u16>,
    },

    #[error("Payment gateway returned an unreadable response: {message}")]
    InvalidResponse { message: String },
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::NotConfigured => false,
            GatewayError::Timeout { .. } => true,
            GatewayError::Network { .. } => true,
            // 5xx from the provider may clear up, 4xx will not
            GatewayError::Provider { status, .. } => matches!(status, Some(s) if *s >= 500),
            GatewayError::InvalidResponse { .. } => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            GatewayError::NotConfigured => {
                "Payments are not configured. Please set STRIPE_SECRET_KEY in environment variables"
                    .to_string()
            }
            GatewayError::Timeout { .. } | GatewayError::Network { .. } => {
                "Payment provider is temporarily unavailable. Please try again".to_string()
            }
            GatewayError::Provider { .. } | GatewayError::InvalidResponse { .. } => {
                "Payment provider returned an error. Please try again later".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_flags_are_set() {
        assert!(GatewayError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(GatewayError::Network {
            message: "connection reset".to_string()
        }
        .is_retryable());
        assert!(!GatewayError::NotConfigured.is_retryable());
        assert!(GatewayError::Provider {
            message: "server error".to_string(),
            status: Some(500)
        }
        .is_retryable());
        assert!(!GatewayError::Provider {
            message: "no such intent".to_string(),
            status: Some(404)
        }
        .is_retryable());
    }

    #[test]
    fn unconfigured_gateway_message_names_the_missing_key() {
        assert!(GatewayError::NotConfigured
            .user_message()
            .contains("STRIPE_SECRET_KEY"));
    }
}
