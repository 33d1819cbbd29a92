//! Shared test doubles: in-memory stores with the same conditional-update
//! semantics as the Postgres implementations, and a scripted payment
//! gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use gigport_backend::auth::{Actor, Role};
use gigport_backend::config::SettlementConfig;
use gigport_backend::database::error::DatabaseError;
use gigport_backend::database::gig_store::{Gig, GigStore};
use gigport_backend::database::order_store::{
    DisputeStatus, NewOrder, Order, OrderFilter, OrderPage, OrderStatus, OrderStore,
};
use gigport_backend::payments::error::{GatewayError, GatewayResult};
use gigport_backend::payments::gateway::{PaymentGateway, PaymentIntent, Refund};
use gigport_backend::services::disputes::DisputeService;
use gigport_backend::services::notification::NotificationService;
use gigport_backend::services::order_lifecycle::OrderLifecycleService;

#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, new_order: NewOrder) -> Result<Order, DatabaseError> {
        let order = Order {
            order_id: Uuid::new_v4(),
            gig_id: new_order.gig_id,
            seller_id: new_order.seller_id,
            buyer_id: new_order.buyer_id,
            title: new_order.title,
            cover_url: new_order.cover_url,
            price_minor: new_order.price_minor,
            currency: new_order.currency,
            payment_intent_id: new_order.payment_intent_id,
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
        };

        self.orders
            .lock()
            .unwrap()
            .insert(order.order_id, order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, DatabaseError> {
        Ok(self.orders.lock().unwrap().get(&order_id).cloned())
    }

    async fn find_by_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Order>, DatabaseError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.payment_intent_id == payment_intent_id)
            .cloned())
    }

    async fn list_completed_for_seller(
        &self,
        seller_id: &str,
    ) -> Result<Vec<Order>, DatabaseError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.seller_id == seller_id && o.is_completed)
            .cloned()
            .collect())
    }

    async fn list_completed_for_buyer(
        &self,
        buyer_id: &str,
    ) -> Result<Vec<Order>, DatabaseError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.buyer_id == buyer_id && o.is_completed)
            .cloned()
            .collect())
    }

    async fn complete_by_intent(
        &self,
        payment_intent_id: &str,
        platform_fee_minor: i64,
        seller_earnings_minor: i64,
    ) -> Result<Option<Order>, DatabaseError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.values_mut().find(|o| {
            o.payment_intent_id == payment_intent_id
                && !o.is_completed
                && matches!(o.status, OrderStatus::Pending | OrderStatus::InProgress)
        });

        Ok(order.map(|o| {
            o.is_completed = true;
            o.status = OrderStatus::Completed;
            o.platform_fee_minor = platform_fee_minor;
            o.seller_earnings_minor = seller_earnings_minor;
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        allowed_from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<Option<Order>, DatabaseError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .filter(|o| allowed_from.contains(&o.status));

        Ok(order.map(|o| {
            o.status = to;
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn open_dispute(
        &self,
        order_id: Uuid,
        reason: &str,
        description: &str,
    ) -> Result<Option<Order>, DatabaseError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .filter(|o| o.dispute_status == DisputeStatus::None);

        Ok(order.map(|o| {
            o.dispute_status = DisputeStatus::Open;
            o.status = OrderStatus::Disputed;
            o.dispute_reason = Some(reason.to_string());
            o.dispute_description = Some(description.to_string());
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn resolve_dispute(
        &self,
        order_id: Uuid,
        resolution: &str,
        resolved_by: &str,
        cancel: bool,
    ) -> Result<Option<Order>, DatabaseError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .filter(|o| o.dispute_status == DisputeStatus::Open);

        Ok(order.map(|o| {
            o.dispute_status = DisputeStatus::Resolved;
            o.admin_resolution = Some(resolution.to_string());
            o.resolved_by = Some(resolved_by.to_string());
            o.resolved_at = Some(Utc::now());
            if cancel {
                o.status = OrderStatus::Cancelled;
            }
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn close_dispute(&self, order_id: Uuid) -> Result<Option<Order>, DatabaseError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .filter(|o| o.dispute_status == DisputeStatus::Open);

        Ok(order.map(|o| {
            o.dispute_status = DisputeStatus::Closed;
            o.status = if o.is_completed {
                OrderStatus::Completed
            } else {
                OrderStatus::Pending
            };
            o.updated_at = Utc::now();
            o.clone()
        }))
    }

    async fn admin_list(&self, filter: &OrderFilter) -> Result<OrderPage, DatabaseError> {
        let orders = self.orders.lock().unwrap();
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .filter(|o| filter.dispute_status.map_or(true, |d| o.dispute_status == d))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let limit = filter.limit.clamp(1, 100) as usize;
        let offset = (filter.page.max(1) as usize - 1) * limit;

        Ok(OrderPage {
            orders: matching.into_iter().skip(offset).take(limit).collect(),
            total,
        })
    }
}

#[derive(Default)]
pub struct InMemoryGigStore {
    gigs: Mutex<HashMap<String, Gig>>,
}

impl InMemoryGigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, gig: Gig) {
        self.gigs.lock().unwrap().insert(gig.gig_id.clone(), gig);
    }
}

#[async_trait]
impl GigStore for InMemoryGigStore {
    async fn find_by_id(&self, gig_id: &str) -> Result<Option<Gig>, DatabaseError> {
        Ok(self.gigs.lock().unwrap().get(gig_id).cloned())
    }
}

/// Scripted gateway: hands out sequential intent ids and records refunds;
/// can be told to fail refund calls.
pub struct MockGateway {
    counter: AtomicU64,
    pub fail_refunds: AtomicBool,
    pub refunds: Mutex<Vec<(String, i64)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            fail_refunds: AtomicBool::new(false),
            refunds: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        _amount_minor: i64,
        _currency: &str,
    ) -> GatewayResult<PaymentIntent> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentIntent {
            intent_id: format!("pi_test_{n}"),
            client_secret: format!("pi_test_{n}_secret"),
        })
    }

    async fn refund(&self, intent_id: &str, amount_minor: i64) -> GatewayResult<Refund> {
        if self.fail_refunds.load(Ordering::SeqCst) {
            return Err(GatewayError::Timeout { timeout_secs: 30 });
        }

        self.refunds
            .lock()
            .unwrap()
            .push((intent_id.to_string(), amount_minor));

        Ok(Refund {
            refund_id: format!("re_{intent_id}"),
            amount_minor,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Everything a lifecycle/dispute test needs, wired together.
pub struct TestHarness {
    pub orders: Arc<InMemoryOrderStore>,
    pub gigs: Arc<InMemoryGigStore>,
    pub gateway: Arc<MockGateway>,
    pub lifecycle: OrderLifecycleService,
    pub disputes: DisputeService,
}

impl TestHarness {
    pub fn new() -> Self {
        let orders = Arc::new(InMemoryOrderStore::new());
        let gigs = Arc::new(InMemoryGigStore::new());
        let gateway = Arc::new(MockGateway::new());
        let notifier = Arc::new(NotificationService::new());

        let lifecycle = OrderLifecycleService::new(
            orders.clone(),
            gigs.clone(),
            gateway.clone(),
            notifier.clone(),
            SettlementConfig {
                platform_fee_bps: 1000,
            },
        );
        let disputes = DisputeService::new(orders.clone(), gateway.clone(), notifier);

        Self {
            orders,
            gigs,
            gateway,
            lifecycle,
            disputes,
        }
    }

    pub fn seed_gig(&self, gig_id: &str, seller_id: &str, price_minor: i64) {
        self.gigs.add(Gig {
            gig_id: gig_id.to_string(),
            seller_id: seller_id.to_string(),
            title: "Test gig".to_string(),
            cover_url: None,
            price_minor,
            currency: "usd".to_string(),
        });
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn buyer(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        role: Role::Buyer,
    }
}

pub fn seller(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        role: Role::Seller,
    }
}

pub fn admin(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        role: Role::Admin,
    }
}
