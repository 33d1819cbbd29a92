//! Order lifecycle endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{parse_order_id, AppState};
use crate::auth::Actor;
use crate::database::order_store::{Order, OrderStatus};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_intent: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub message: String,
    pub order: Order,
}

/// POST /orders/intent/{gig_id}
pub async fn create_intent(
    State(state): State<AppState>,
    actor: Actor,
    Path(gig_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!(gig_id = %gig_id, buyer_id = %actor.id, "Payment intent requested");

    let purchase = state.lifecycle.request_purchase(&gig_id, &actor).await?;

    Ok((
        StatusCode::OK,
        Json(IntentResponse {
            client_secret: purchase.client_secret,
        }),
    ))
}

/// POST /orders/confirm
pub async fn confirm_payment(
    State(state): State<AppState>,
    _actor: Actor,
    Json(body): Json<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.lifecycle.confirm_payment(&body.payment_intent).await?;

    Ok((
        StatusCode::OK,
        Json(OrderEnvelope {
            message: "Order has been confirmed".to_string(),
            order,
        }),
    ))
}

/// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.lifecycle.list_orders(&actor).await?;

    Ok((StatusCode::OK, Json(orders)))
}

/// PUT /orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .lifecycle
        .update_status(order_id, &actor, body.status)
        .await?;

    Ok((
        StatusCode::OK,
        Json(OrderEnvelope {
            message: "Order status updated successfully".to_string(),
            order,
        }),
    ))
}
