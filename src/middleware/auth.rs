//! Actor extraction.
//!
//! Turns the request's bearer token or `accessToken` cookie into an
//! [`Actor`] via the authorization gate. Handlers that take an `Actor`
//! parameter are authenticated by construction; authorization stays with
//! the services, checked against the loaded entity.

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::AppState;
use crate::auth::{extract_token, Actor};
use crate::error::AppError;

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let cookies = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok());

        let token = extract_token(authorization, cookies)?;
        state.verifier.verify(&token)
    }
}
