//! Order lifecycle controller.
//!
//! Orchestrates payment-intent creation, confirmation, role-scoped reads,
//! and participant cancellation. Ownership and role predicates are checked
//! here against the loaded order, never against client-supplied ids.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{Actor, Role};
use crate::config::SettlementConfig;
use crate::database::gig_store::GigStore;
use crate::database::order_store::{NewOrder, Order, OrderStatus, OrderStore};
use crate::error::{AppError, AppResult};
use crate::payments::gateway::PaymentGateway;
use crate::services::notification::{NotificationEvent, NotificationService};
use crate::services::settlement;

/// Result of a purchase request: the created order plus the secret the
/// client needs to complete the charge out-of-band.
#[derive(Debug, Clone)]
pub struct PurchaseIntent {
    pub client_secret: String,
    pub order: Order,
}

pub struct OrderLifecycleService {
    orders: Arc<dyn OrderStore>,
    gigs: Arc<dyn GigStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<NotificationService>,
    settlement: SettlementConfig,
}

impl OrderLifecycleService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        gigs: Arc<dyn GigStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<NotificationService>,
        settlement: SettlementConfig,
    ) -> Self {
        Self {
            orders,
            gigs,
            gateway,
            notifier,
            settlement,
        }
    }

    /// Create a payment intent for a gig and persist the matching order in
    /// `pending` state, snapshotting the listing fields.
    ///
    /// Each call creates one order; a client retry before confirmation will
    /// create a second pending order tied to its own intent.
    pub async fn request_purchase(&self, gig_id: &str, actor: &Actor) -> AppResult<PurchaseIntent> {
        let gig = self
            .gigs
            .find_by_id(gig_id)
            .await?
            .ok_or_else(|| AppError::not_found("Gig"))?;

        if gig.seller_id == actor.id {
            return Err(AppError::forbidden("You cannot purchase your own gig"));
        }

        let intent = self
            .gateway
            .create_intent(gig.price_minor, &gig.currency)
            .await?;

        let order = self
            .orders
            .insert(NewOrder {
                gig_id: gig.gig_id.clone(),
                seller_id: gig.seller_id.clone(),
                buyer_id: actor.id.clone(),
                title: gig.title.clone(),
                cover_url: gig.cover_url.clone(),
                price_minor: gig.price_minor,
                currency: gig.currency.clone(),
                payment_intent_id: intent.intent_id.clone(),
            })
            .await?;

        info!(
            order_id = %order.order_id,
            gig_id = %gig.gig_id,
            buyer_id = %actor.id,
            "Order created in pending state"
        );

        self.notifier
            .send(&order, NotificationEvent::OrderCreated, "Awaiting payment")
            .await;

        Ok(PurchaseIntent {
            client_secret: intent.client_secret,
            order,
        })
    }

    /// Apply the gateway's confirmation signal: mark the order completed
    /// and freeze the settlement split.
    ///
    /// Idempotent: confirming an already-completed intent returns the
    /// existing order unchanged. A confirmation losing a race against a
    /// dispute or cancellation is a conflict.
    pub async fn confirm_payment(&self, payment_intent_id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_intent(payment_intent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        if order.is_completed {
            return Ok(order);
        }

        let split = settlement::split(order.price_minor, self.settlement.platform_fee_bps)?;

        let updated = self
            .orders
            .complete_by_intent(
                payment_intent_id,
                split.platform_fee_minor,
                split.seller_earnings_minor,
            )
            .await?;

        match updated {
            Some(order) => {
                info!(
                    order_id = %order.order_id,
                    platform_fee_minor = order.platform_fee_minor,
                    seller_earnings_minor = order.seller_earnings_minor,
                    "Order completed"
                );

                self.notifier
                    .send(
                        &order,
                        NotificationEvent::OrderStatusChanged,
                        "Payment confirmed",
                    )
                    .await;

                Ok(order)
            }
            None => {
                // Lost the guard; either a concurrent confirmation already
                // won (fine) or the order moved to a state that can no
                // longer complete.
                let current = self
                    .orders
                    .find_by_intent(payment_intent_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Order"))?;

                if current.is_completed {
                    return Ok(current);
                }

                warn!(
                    order_id = %current.order_id,
                    status = ?current.status,
                    "Payment confirmation rejected by state guard"
                );

                Err(AppError::conflict(
                    "Order can no longer be completed in its current state",
                ))
            }
        }
    }

    /// Role-scoped listing: sellers see their sales, everyone else their
    /// purchases. Only confirmed orders are shown.
    pub async fn list_orders(&self, actor: &Actor) -> AppResult<Vec<Order>> {
        let orders = match actor.role {
            Role::Seller => self.orders.list_completed_for_seller(&actor.id).await?,
            Role::Buyer | Role::Admin => self.orders.list_completed_for_buyer(&actor.id).await?,
        };

        Ok(orders)
    }

    /// Participant/admin status transition. Only `in_progress` and
    /// `cancelled` are reachable here; completion and dispute states have
    /// dedicated paths.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        actor: &Actor,
        target: OrderStatus,
    ) -> AppResult<Order> {
        let allowed_from: &[OrderStatus] = match target {
            OrderStatus::InProgress => &[OrderStatus::Pending],
            OrderStatus::Cancelled => &[OrderStatus::Pending, OrderStatus::InProgress],
            _ => {
                return Err(AppError::invalid_argument(
                    "Status can only be set to in_progress or cancelled",
                ))
            }
        };

        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))?;

        if !order.is_participant(&actor.id) && !actor.is_admin() {
            return Err(AppError::forbidden(
                "Only the buyer, the seller, or an admin can update this order",
            ));
        }

        let updated = self
            .orders
            .transition_status(order_id, allowed_from, target)
            .await?
            .ok_or_else(|| {
                AppError::conflict("Order cannot change status from its current state")
            })?;

        self.notifier
            .send(
                &updated,
                NotificationEvent::OrderStatusChanged,
                "Status updated",
            )
            .await;

        Ok(updated)
    }
}
