//! Dispute endpoints: participants open, admins adjudicate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::orders::OrderEnvelope;
use crate::api::{parse_order_id, AppState};
use crate::auth::Actor;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct OpenDisputeRequest {
    pub reason: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveDisputeRequest {
    pub resolution: String,
    pub refund_amount: Option<i64>,
}

/// PUT /orders/{id}/dispute
pub async fn open_dispute(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<OpenDisputeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .disputes
        .open_dispute(order_id, &actor, &body.reason, &body.description)
        .await?;

    Ok((
        StatusCode::OK,
        Json(OrderEnvelope {
            message: "Dispute opened successfully".to_string(),
            order,
        }),
    ))
}

/// PUT /orders/{id}/resolve-dispute
pub async fn resolve_dispute(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(body): Json<ResolveDisputeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let order_id = parse_order_id(&id)?;

    let order = state
        .disputes
        .resolve_dispute(order_id, &actor, &body.resolution, body.refund_amount)
        .await?;

    Ok((
        StatusCode::OK,
        Json(OrderEnvelope {
            message: "Dispute resolved successfully".to_string(),
            order,
        }),
    ))
}

/// PUT /orders/{id}/close-dispute
pub async fn close_dispute(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order_id = parse_order_id(&id)?;

    let order = state.disputes.close_dispute(order_id, &actor).await?;

    Ok((
        StatusCode::OK,
        Json(OrderEnvelope {
            message: "Dispute closed without resolution".to_string(),
            order,
        }),
    ))
}
