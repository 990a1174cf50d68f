use actix_web::{http::StatusCode, test::TestRequest};
use openship_engine::{
    test_utils::prepare_env::{prepare_test_env, sample_order, seeded_database},
    RoutingDatabase,
};
use platform_tools::{data_objects::OrderStatus, AdapterError};

use super::{
    helpers::{json, send},
    mocks::{MockAdapters, MockChannelPlatform, MockShopPlatform},
};

fn delivery(path: &str) -> TestRequest {
    TestRequest::post()
        .uri(path)
        .insert_header(("X-Shopify-Hmac-Sha256", "c2lnbmF0dXJl"))
        .set_payload(r#"{"id":5001}"#)
}

#[actix_web::test]
async fn new_orders_are_stored_and_routed() {
    prepare_test_env();
    let db = seeded_database();
    let mut shop = MockShopPlatform::new();
    shop.expect_normalize_order_created().times(1).returning(|req| {
        assert_eq!(req.header("x-shopify-hmac-sha256"), Some("c2lnbmF0dXJl"));
        assert_eq!(req.body, br#"{"id":5001}"#);
        Ok(sample_order("5001"))
    });
    let (status, body) =
        send(&db, MockAdapters::with_shop(shop), delivery("/api/handlers/shop/create-order/1")).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Order #5001 saved as #1");

    let record = db.fetch_order(1).await.unwrap().expect("Order was not stored");
    assert_eq!(record.order.status, OrderStatus::InProcess);
    assert_eq!(record.routes.len(), 1);
    assert_eq!(record.order.cart_items[0].product_id, "70");
}

#[actix_web::test]
async fn forged_deliveries_are_rejected() {
    prepare_test_env();
    let db = seeded_database();
    let mut shop = MockShopPlatform::new();
    shop.expect_normalize_order_created()
        .returning(|_| Err(AdapterError::InvalidSignature("Webhook HMAC does not match".into())));
    let (status, body) =
        send(&db, MockAdapters::with_shop(shop), delivery("/api/handlers/shop/create-order/1")).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json(&body)["error"].as_str().unwrap().contains("Webhook HMAC does not match"));
    assert!(db.fetch_orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn failed_deliveries_are_still_acknowledged() {
    prepare_test_env();
    let db = seeded_database();
    // Shop #9 does not exist, so the adapter is never reached
    let (status, body) =
        send(&db, MockAdapters::unused(), delivery("/api/handlers/shop/create-order/9")).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Shop #9 does not exist");
}

#[actix_web::test]
async fn deliveries_that_cancel_nothing_are_acknowledged() {
    prepare_test_env();
    let db = seeded_database();
    let mut channel = MockChannelPlatform::new();
    channel.expect_normalize_purchase_cancelled().times(1).returning(|_| Ok(None));
    let req = delivery("/api/handlers/channel/cancel-purchase/1");
    let (status, body) = send(&db, MockAdapters::with_channel(channel), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Nothing to cancel");
}

#[actix_web::test]
async fn tracking_for_unknown_purchases_is_reported() {
    prepare_test_env();
    let db = seeded_database();
    let mut channel = MockChannelPlatform::new();
    channel.expect_normalize_tracking_created().times(1).returning(|_| {
        Ok(platform_tools::data_objects::TrackingInfo {
            purchase_id: "8801".into(),
            tracking_number: "1Z999".into(),
            tracking_company: Some("UPS".into()),
            tracking_url: None,
        })
    });
    let req = delivery("/api/handlers/channel/create-tracking/1");
    let (status, body) = send(&db, MockAdapters::with_channel(channel), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Purchase 8801 on channel #1 does not exist");
}
