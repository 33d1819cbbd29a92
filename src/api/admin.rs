//! Admin oversight reads: paginated order listing and detail.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{parse_order_id, AppState};
use crate::auth::Actor;
use crate::database::order_store::{DisputeStatus, Order, OrderFilter, OrderStatus};
use crate::error::AppError;

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrdersQuery {
    pub status: Option<OrderStatus>,
    pub dispute_status: Option<DisputeStatus>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_orders: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize)]
pub struct AdminOrdersResponse {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderResponse {
    pub order: Order,
}

/// GET /admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<AdminOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = OrderFilter {
        status: query.status,
        dispute_status: query.dispute_status,
        page: query.page.max(1),
        limit: query.limit.clamp(1, 100),
    };

    let page = state.disputes.admin_list(&actor, &filter).await?;

    let total_pages = (page.total as u64).div_ceil(filter.limit as u64) as u32;

    Ok((
        StatusCode::OK,
        Json(AdminOrdersResponse {
            pagination: Pagination {
                current_page: filter.page,
                total_pages,
                total_orders: page.total,
                has_next: filter.page < total_pages,
                has_prev: filter.page > 1,
            },
            orders: page.orders,
        }),
    ))
}

/// GET /admin/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order_id = parse_order_id(&id)?;

    let order = state.disputes.admin_get(&actor, order_id).await?;

    Ok((StatusCode::OK, Json(AdminOrderResponse { order })))
}
