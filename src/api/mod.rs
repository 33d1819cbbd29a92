pub mod admin;
pub mod disputes;
pub mod orders;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::health;
use crate::services::disputes::DisputeService;
use crate::services::order_lifecycle::OrderLifecycleService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<OrderLifecycleService>,
    pub disputes: Arc<DisputeService>,
    pub verifier: Arc<TokenVerifier>,
    pub pool: PgPool,
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/orders/intent/{gig_id}", post(orders::create_intent))
        .route("/orders/confirm", post(orders::confirm_payment))
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/orders/{id}/dispute", put(disputes::open_dispute))
        .route(
            "/orders/{id}/resolve-dispute",
            put(disputes::resolve_dispute),
        )
        .route("/orders/{id}/close-dispute", put(disputes::close_dispute))
        .route("/admin/orders", get(admin::list_orders))
        .route("/admin/orders/{id}", get(admin::get_order))
        .with_state(state)
}

/// Parse a path segment as an order id, mapping garbage to the standard
/// invalid-argument envelope instead of axum's plain-text rejection.
pub(crate) fn parse_order_id(raw: &str) -> Result<uuid::Uuid, crate::error::AppError> {
    uuid::Uuid::parse_str(raw)
        .map_err(|_| crate::error::AppError::invalid_argument("Invalid order id"))
}
