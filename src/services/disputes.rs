//! Dispute and adjudication controller.
//!
//! Participants open disputes; admins resolve or close them. The dispute
//! state machine is none -> open -> resolved | closed, enforced by guarded
//! updates so a concurrent adjudicator loses with a conflict instead of
//! overwriting.

use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::auth::Actor;
use crate::database::order_store::{Order, OrderFilter, OrderPage, OrderStore};
use crate::error::{AppError, AppResult};
use crate::payments::gateway::PaymentGateway;
use crate::services::notification::{NotificationEvent, NotificationService};

pub struct DisputeService {
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<NotificationService>,
}

impl DisputeService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<NotificationService>,
    ) -> Self {
        Self {
            orders,
            gateway,
            notifier,
        }
    }

    /// Open a dispute on behalf of a transacting party.
    pub async fn open_dispute(
        &self,
        order_id: Uuid,
        actor: &Actor,
        reason: &str,
        description: &str,
    ) -> AppResult<Order> {
        if reason.trim().is_empty() {
            return Err(AppError::invalid_argument("Dispute reason is required"));
        }

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        if !order.is_participant(&actor.id) {
            return Err(AppError::forbidden(
                "Only the buyer or the seller can dispute this order",
            ));
        }

        let disputed = self
            .orders
            .open_dispute(order_id, reason, description)
            .await?
            .ok_or_else(|| AppError::conflict("A dispute already exists for this order"))?;

        info!(
            order_id = %order_id,
            opened_by = %actor.id,
            reason = %reason,
            "Dispute opened"
        );

        self.notifier
            .send(
                &disputed,
                NotificationEvent::OrderStatusChanged,
                "Dispute opened",
            )
            .await;

        Ok(disputed)
    }

    /// Admin adjudication. Records the resolution triple atomically and,
    /// for a positive refund, cancels the order and pushes the refund to
    /// the payment gateway.
    pub async fn resolve_dispute(
        &self,
        order_id: Uuid,
        actor: &Actor,
        resolution: &str,
        refund_minor: Option<i64>,
    ) -> AppResult<Order> {
        if !actor.is_admin() {
            return Err(AppError::forbidden(
                "Access denied. Admin privileges required",
            ));
        }

        if resolution.trim().is_empty() {
            return Err(AppError::invalid_argument("Resolution text is required"));
        }

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        let refund_minor = refund_minor.unwrap_or(0);
        if refund_minor < 0 {
            return Err(AppError::invalid_argument("Refund amount cannot be negative"));
        }
        if refund_minor > order.price_minor {
            return Err(AppError::invalid_argument(
                "Refund amount cannot exceed the order price",
            ));
        }

        // Claim the resolution first; exactly one adjudicator can win this
        // update, so the refund below can never be issued twice.
        let resolved = self
            .orders
            .resolve_dispute(order_id, resolution, &actor.id, refund_minor > 0)
            .await?
            .ok_or_else(|| AppError::conflict("No open dispute for this order"))?;

        if refund_minor > 0 {
            if let Err(err) = self
                .gateway
                .refund(&resolved.payment_intent_id, refund_minor)
                .await
            {
                // The adjudication record is already durable; surface the
                // gateway failure so the refund gets re-issued by hand.
                error!(
                    order_id = %order_id,
                    intent_id = %resolved.payment_intent_id,
                    refund_minor,
                    error = %err,
                    "Refund failed after dispute resolution"
                );
                return Err(err.into());
            }

            info!(
                order_id = %order_id,
                refund_minor,
                "Refund issued for resolved dispute"
            );
        }

        self.notifier
            .send(
                &resolved,
                NotificationEvent::DisputeResolved,
                "Dispute resolved by admin",
            )
            .await;

        Ok(resolved)
    }

    /// Admin close-without-resolution. Funds stay with the seller; the
    /// order returns to its pre-dispute standing.
    pub async fn close_dispute(&self, order_id: Uuid, actor: &Actor) -> AppResult<Order> {
        if !actor.is_admin() {
            return Err(AppError::forbidden(
                "Access denied. Admin privileges required",
            ));
        }

        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        let closed = self
            .orders
            .close_dispute(order_id)
            .await?
            .ok_or_else(|| AppError::conflict("No open dispute for this order"))?;

        info!(order_id = %order_id, closed_by = %actor.id, "Dispute closed without resolution");

        self.notifier
            .send(
                &closed,
                NotificationEvent::OrderStatusChanged,
                "Dispute closed",
            )
            .await;

        Ok(closed)
    }

    /// Admin-only paginated listing with status filters.
    pub async fn admin_list(&self, actor: &Actor, filter: &OrderFilter) -> AppResult<OrderPage> {
        if !actor.is_admin() {
            return Err(AppError::forbidden(
                "Access denied. Admin privileges required",
            ));
        }

        Ok(self.orders.admin_list(filter).await?)
    }

    /// Admin-only detail read.
    pub async fn admin_get(&self, actor: &Actor, order_id: Uuid) -> AppResult<Order> {
        if !actor.is_admin() {
            return Err(AppError::forbidden(
                "Access denied. Admin privileges required",
            ));
        }

        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))
    }
}
