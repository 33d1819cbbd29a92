use crate::database::order_store::Order;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationEvent {
    OrderCreated,
    OrderStatusChanged,
    DisputeResolved,
}

/// Fire-and-forget notification sender.
///
/// Delivery failures are logged and swallowed; a notification must never
/// roll back or surface into the state transition that triggered it.
pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        Self
    }

    pub async fn send(&self, order: &Order, event: NotificationEvent, message: &str) {
        // Stands in for the real delivery channel (email, push, webhook);
        // structured enough that downstream log shipping can fan it out.
        match event {
            NotificationEvent::OrderCreated => {
                info!(
                    order_id = %order.order_id,
                    buyer_id = %order.buyer_id,
                    seller_id = %order.seller_id,
                    price_minor = order.price_minor,
                    "NOTIFICATION: Order created - {}", message
                );
            }
            NotificationEvent::OrderStatusChanged => {
                info!(
                    order_id = %order.order_id,
                    status = ?order.status,
                    "NOTIFICATION: Order status changed - {}", message
                );
            }
            NotificationEvent::DisputeResolved => {
                info!(
                    order_id = %order.order_id,
                    dispute_status = ?order.dispute_status,
                    resolved_by = ?order.resolved_by,
                    "NOTIFICATION: Dispute resolved - {}", message
                );
            }
        }
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}
