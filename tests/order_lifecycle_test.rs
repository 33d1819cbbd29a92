mod common;

use common::{admin, buyer, seller, TestHarness};
use gigport_backend::database::order_store::{DisputeStatus, OrderStatus};

#[tokio::test]
async fn purchase_creates_pending_order_with_listing_snapshot() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();

    assert!(!purchase.client_secret.is_empty());

    let order = &purchase.order;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.dispute_status, DisputeStatus::None);
    assert!(!order.is_completed);
    assert_eq!(order.price_minor, 5000);
    assert_eq!(order.seller_id, "seller-1");
    assert_eq!(order.buyer_id, "buyer-1");
    assert_eq!(order.platform_fee_minor, 0);
    assert_eq!(order.seller_earnings_minor, 0);
}

#[tokio::test]
async fn purchase_of_unknown_gig_is_not_found() {
    let harness = TestHarness::new();

    let err = harness
        .lifecycle
        .request_purchase("missing", &buyer("buyer-1"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn seller_cannot_purchase_their_own_gig() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let err = harness
        .lifecycle
        .request_purchase("gig-1", &seller("seller-1"))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn confirmation_completes_order_and_freezes_settlement() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();
    let intent = purchase.order.payment_intent_id.clone();

    let order = harness.lifecycle.confirm_payment(&intent).await.unwrap();

    assert!(order.is_completed);
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.platform_fee_minor, 500);
    assert_eq!(order.seller_earnings_minor, 4500);
    assert_eq!(
        order.platform_fee_minor + order.seller_earnings_minor,
        order.price_minor
    );
}

#[tokio::test]
async fn confirming_twice_is_idempotent() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();
    let intent = purchase.order.payment_intent_id.clone();

    let first = harness.lifecycle.confirm_payment(&intent).await.unwrap();
    let second = harness.lifecycle.confirm_payment(&intent).await.unwrap();

    assert_eq!(first.order_id, second.order_id);
    assert_eq!(second.status, OrderStatus::Completed);
    assert_eq!(second.platform_fee_minor, 500);
    assert_eq!(second.seller_earnings_minor, 4500);
    assert_eq!(second.updated_at, first.updated_at);
}

#[tokio::test]
async fn confirming_unknown_intent_is_not_found() {
    let harness = TestHarness::new();

    let err = harness
        .lifecycle
        .confirm_payment("pi_missing")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn confirmation_loses_against_an_open_dispute() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();
    let order_id = purchase.order.order_id;
    let intent = purchase.order.payment_intent_id.clone();

    harness
        .disputes
        .open_dispute(order_id, &buyer("buyer-1"), "not delivered", "")
        .await
        .unwrap();

    let err = harness.lifecycle.confirm_payment(&intent).await.unwrap_err();

    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn listing_is_scoped_by_role_and_hides_unconfirmed_orders() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);
    harness.seed_gig("gig-2", "seller-2", 3000);

    // Completed purchase by buyer-1 from seller-1.
    let completed = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();
    harness
        .lifecycle
        .confirm_payment(&completed.order.payment_intent_id)
        .await
        .unwrap();

    // Pending purchase stays invisible to both sides.
    harness
        .lifecycle
        .request_purchase("gig-2", &buyer("buyer-1"))
        .await
        .unwrap();

    let seller_view = harness
        .lifecycle
        .list_orders(&seller("seller-1"))
        .await
        .unwrap();
    assert_eq!(seller_view.len(), 1);
    assert_eq!(seller_view[0].seller_id, "seller-1");

    let buyer_view = harness
        .lifecycle
        .list_orders(&buyer("buyer-1"))
        .await
        .unwrap();
    assert_eq!(buyer_view.len(), 1);
    assert!(buyer_view[0].is_completed);

    let other_seller = harness
        .lifecycle
        .list_orders(&seller("seller-2"))
        .await
        .unwrap();
    assert!(other_seller.is_empty());
}

#[tokio::test]
async fn participant_can_cancel_pending_order() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();

    let order = harness
        .lifecycle
        .update_status(purchase.order.order_id, &buyer("buyer-1"), OrderStatus::Cancelled)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn stranger_cannot_cancel_an_order() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();

    let err = harness
        .lifecycle
        .update_status(purchase.order.order_id, &buyer("stranger"), OrderStatus::Cancelled)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn completed_order_cannot_be_cancelled() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();
    harness
        .lifecycle
        .confirm_payment(&purchase.order.payment_intent_id)
        .await
        .unwrap();

    let err = harness
        .lifecycle
        .update_status(purchase.order.order_id, &admin("admin-1"), OrderStatus::Cancelled)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
}

#[tokio::test]
async fn completion_is_not_reachable_through_the_status_endpoint() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();

    let err = harness
        .lifecycle
        .update_status(purchase.order.order_id, &admin("admin-1"), OrderStatus::Completed)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn seller_can_start_work_on_a_pending_order() {
    let harness = TestHarness::new();
    harness.seed_gig("gig-1", "seller-1", 5000);

    let purchase = harness
        .lifecycle
        .request_purchase("gig-1", &buyer("buyer-1"))
        .await
        .unwrap();

    let order = harness
        .lifecycle
        .update_status(purchase.order.order_id, &seller("seller-1"), OrderStatus::InProgress)
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::InProgress);
}
