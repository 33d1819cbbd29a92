//! Order persistence.
//!
//! Every status or dispute mutation is a conditional update keyed on the
//! expected prior state. A guard that matches no row returns `None`, and
//! the caller decides between not-found and conflict. The store never
//! overwrites a concurrent writer's result.

use crate::database::error::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "dispute_status", rename_all = "snake_case")]
pub enum DisputeStatus {
    None,
    Open,
    Resolved,
    Closed,
}

/// Order entity
///
/// Listing fields (`title`, `price_minor`, `cover_url`) are snapshots taken
/// at purchase time; later gig edits never alter historical orders.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: Uuid,
    pub gig_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub payment_intent_id: String,
    pub is_completed: bool,
    pub status: OrderStatus,
    pub dispute_status: DisputeStatus,
    pub dispute_reason: Option<String>,
    pub dispute_description: Option<String>,
    pub admin_resolution: Option<String>,
    pub resolved_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub platform_fee_minor: i64,
    pub seller_earnings_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether the given actor id is a transacting party on this order.
    pub fn is_participant(&self, actor_id: &str) -> bool {
        self.buyer_id == actor_id || self.seller_id == actor_id
    }
}

/// Fields required to create an order at payment-intent time.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub gig_id: String,
    pub seller_id: String,
    pub buyer_id: String,
    pub title: String,
    pub cover_url: Option<String>,
    pub price_minor: i64,
    pub currency: String,
    pub payment_intent_id: String,
}

/// Admin listing filter with pagination.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub dispute_status: Option<DisputeStatus>,
    pub page: u32,
    pub limit: u32,
}

/// One page of orders plus the unpaginated total.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
}

/// Persistence seam for orders.
///
/// Conditional mutations return `Ok(None)` when the state guard matched no
/// row; they never error on a lost race.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, new_order: NewOrder) -> Result<Order, DatabaseError>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, DatabaseError>;

    async fn find_by_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DatabaseError>;

    async fn list_completed_for_seller(
        &self,
        seller_id: &str,
    ) -> Result<Vec<Order>, DatabaseError>;

    async fn list_completed_for_buyer(&self, buyer_id: &str)
        -> Result<Vec<Order>, DatabaseError>;

    /// Flip the completion flag and freeze the settlement split, guarded on
    /// `is_completed = false` and an undisturbed status (pending or
    /// in_progress). A confirmation racing a dispute or cancellation loses.
    async fn complete_by_intent(
        &self,
        payment_intent_id: &str,
        platform_fee_minor: i64,
        seller_earnings_minor: i64,
    ) -> Result<Option<Order>, DatabaseError>;

    /// Move `status` to `to`, guarded on the current status being one of
    /// `allowed_from`.
    async fn transition_status(
        &self,
        order_id: Uuid,
        allowed_from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<Option<Order>, DatabaseError>;

    /// Open a dispute, guarded on `dispute_status = none`.
    async fn open_dispute(
        &self,
        order_id: Uuid,
        reason: &str,
        description: &str,
    ) -> Result<Option<Order>, DatabaseError>;

    /// Record an adjudication, guarded on `dispute_status = open`. The
    /// resolution triple and the optional cancellation land in one
    /// statement.
    async fn resolve_dispute(
        &self,
        order_id: Uuid,
        resolution: &str,
        resolved_by: &str,
        cancel: bool,
    ) -> Result<Option<Order>, DatabaseError>;

    /// Close without resolution, guarded on `dispute_status = open`. The
    /// order returns to completed or pending depending on whether payment
    /// was confirmed.
    async fn close_dispute(&self, order_id: Uuid) -> Result<Option<Order>, DatabaseError>;

    async fn admin_list(&self, filter: &OrderFilter) -> Result<OrderPage, DatabaseError>;
}

const ORDER_COLUMNS: &str = "order_id, gig_id, seller_id, buyer_id, title, cover_url, \
     price_minor, currency, payment_intent_id, is_completed, status, dispute_status, \
     dispute_reason, dispute_description, admin_resolution, resolved_by, resolved_at, \
     platform_fee_minor, seller_earnings_minor, created_at, updated_at";

/// Postgres-backed order store.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, new_order: NewOrder) -> Result<Order, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders \
             (order_id, gig_id, seller_id, buyer_id, title, cover_url, price_minor, \
              currency, payment_intent_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&new_order.gig_id)
        .bind(&new_order.seller_id)
        .bind(&new_order.buyer_id)
        .bind(&new_order.title)
        .bind(&new_order.cover_url)
        .bind(new_order.price_minor)
        .bind(&new_order.currency)
        .bind(&new_order.payment_intent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn find_by_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_intent_id = $1"
        ))
        .bind(payment_intent_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn list_completed_for_seller(
        &self,
        seller_id: &str,
    ) -> Result<Vec<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE seller_id = $1 AND is_completed = TRUE \
             ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn list_completed_for_buyer(
        &self,
        buyer_id: &str,
    ) -> Result<Vec<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE buyer_id = $1 AND is_completed = TRUE \
             ORDER BY created_at DESC"
        ))
        .bind(buyer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn complete_by_intent(
        &self,
        payment_intent_id: &str,
        platform_fee_minor: i64,
        seller_earnings_minor: i64,
    ) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders \
             SET is_completed = TRUE, status = 'completed', \
                 platform_fee_minor = $2, seller_earnings_minor = $3, updated_at = now() \
             WHERE payment_intent_id = $1 AND is_completed = FALSE \
               AND status IN ('pending', 'in_progress') \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(payment_intent_id)
        .bind(platform_fee_minor)
        .bind(seller_earnings_minor)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        allowed_from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2, updated_at = now() \
             WHERE order_id = $1 AND status = ANY($3) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(to)
        .bind(allowed_from.to_vec())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn open_dispute(
        &self,
        order_id: Uuid,
        reason: &str,
        description: &str,
    ) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders \
             SET dispute_status = 'open', status = 'disputed', \
                 dispute_reason = $2, dispute_description = $3, updated_at = now() \
             WHERE order_id = $1 AND dispute_status = 'none' \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(reason)
        .bind(description)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn resolve_dispute(
        &self,
        order_id: Uuid,
        resolution: &str,
        resolved_by: &str,
        cancel: bool,
    ) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders \
             SET dispute_status = 'resolved', admin_resolution = $2, \
                 resolved_by = $3, resolved_at = now(), \
                 status = CASE WHEN $4 THEN 'cancelled'::order_status ELSE status END, \
                 updated_at = now() \
             WHERE order_id = $1 AND dispute_status = 'open' \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .bind(resolution)
        .bind(resolved_by)
        .bind(cancel)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn close_dispute(&self, order_id: Uuid) -> Result<Option<Order>, DatabaseError> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders \
             SET dispute_status = 'closed', \
                 status = CASE WHEN is_completed THEN 'completed'::order_status \
                               ELSE 'pending'::order_status END, \
                 updated_at = now() \
             WHERE order_id = $1 AND dispute_status = 'open' \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    async fn admin_list(&self, filter: &OrderFilter) -> Result<OrderPage, DatabaseError> {
        let limit = filter.limit.clamp(1, 100) as i64;
        let offset = filter.page.max(1) as i64 * limit - limit;

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::order_status IS NULL OR status = $1) \
               AND ($2::dispute_status IS NULL OR dispute_status = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(filter.status)
        .bind(filter.dispute_status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders \
             WHERE ($1::order_status IS NULL OR status = $1) \
               AND ($2::dispute_status IS NULL OR dispute_status = $2)",
        )
        .bind(filter.status)
        .bind(filter.dispute_status)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(OrderPage { orders, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_check_matches_buyer_and_seller_only() {
        let order = sample_order();

        assert!(order.is_participant("buyer-1"));
        assert!(order.is_participant("seller-1"));
        assert!(!order.is_participant("admin-1"));
        assert!(!order.is_participant("stranger"));
    }

    #[test]
    fn status_enums_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_value(OrderStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        assert_eq!(
            serde_json::to_value(DisputeStatus::None).unwrap(),
            serde_json::json!("none")
        );
    }

    fn sample_order() -> Order {
        Order {
            order_id: Uuid::new_v4(),
            gig_id: "gig-1".to_string(),
            seller_id: "seller-1".to_string(),
            buyer_id: "buyer-1".to_string(),
            title: "Logo design".to_string(),
            cover_url: None,
            price_minor: 5000,
            currency: "usd".to_string(),
            payment_intent_id: "pi_1".to_string(),
            is_completed: false,
            status: OrderStatus::Pending,
            dispute_status: DisputeStatus::None,
            dispute_reason: None,
            dispute_description: None,
            admin_resolution: None,
            resolved_by: None,
            resolved_at: None,
            platform_fee_minor: 0,
            seller_earnings_minor: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
