//! Authorization gate.
//!
//! Decodes and verifies the signed session token once per request and
//! resolves the ad-hoc role flags into a single closed role. Controllers
//! receive the resulting [`Actor`] explicitly and re-check ownership
//! against the loaded entity; nothing downstream re-reads token claims.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;

/// Claims carried by the session token, in the wire shape the web client
/// already uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    #[serde(rename = "isSeller", default)]
    pub is_seller: bool,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    #[serde(default)]
    pub iat: usize,
    pub exp: usize,
}

/// Closed role set resolved from the token flags. Admin wins over seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

/// Authenticated actor descriptor passed into every controller call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_seller(&self) -> bool {
        self.role == Role::Seller
    }
}

impl From<TokenClaims> for Actor {
    fn from(claims: TokenClaims) -> Self {
        let role = if claims.is_admin {
            Role::Admin
        } else if claims.is_seller {
            Role::Seller
        } else {
            Role::Buyer
        };

        Actor {
            id: claims.id,
            role,
        }
    }
}

/// Verifies session tokens with the shared HS256 secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, resolve the actor.
    pub fn verify(&self, token: &str) -> Result<Actor, AppError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthenticated("Token has expired"),
                _ => AppError::unauthenticated("Invalid token"),
            },
        )?;

        Ok(Actor::from(data.claims))
    }
}

/// Pull the raw token out of the request: `Authorization: Bearer` first,
/// then the `accessToken` cookie the original web client sets.
pub fn extract_token(
    authorization: Option<&str>,
    cookie_header: Option<&str>,
) -> Result<String, AppError> {
    if let Some(value) = authorization {
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(AppError::unauthenticated(
                "Invalid authorization header scheme",
            )),
        };
    }

    if let Some(cookies) = cookie_header {
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == "accessToken" && !value.is_empty() {
                    return Ok(value.to_string());
                }
            }
        }
    }

    Err(AppError::unauthenticated("You are not authenticated"))
}
