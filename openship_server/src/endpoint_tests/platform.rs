use actix_web::{http::StatusCode, test::TestRequest};
use openship_engine::test_utils::prepare_env::{prepare_test_env, seeded_database};
use platform_tools::{
    data_objects::{PageInfo, ProductPage, Webhook, WebhookEvent},
    AdapterError,
};
use serde_json::json as value;

use super::{
    helpers::{json, send},
    mocks::{MockAdapters, MockChannelPlatform, MockShopPlatform},
};

#[actix_web::test]
async fn products_are_searched_on_the_named_record() {
    prepare_test_env();
    let db = seeded_database();
    let mut channel = MockChannelPlatform::new();
    channel
        .expect_search_products()
        .withf(|entry, after| entry == "moss" && after.as_deref() == Some("c1"))
        .times(1)
        .returning(|_, _| Ok(ProductPage { products: vec![], page_info: PageInfo::last_page() }));
    let req = TestRequest::post()
        .uri("/api/channels/1/products/search")
        .set_json(value!({ "searchEntry": "moss", "after": "c1" }));
    let (status, body) = send(&db, MockAdapters::with_channel(channel), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let page = json(&body);
    assert_eq!(page["products"], value!([]));
    assert_eq!(page["pageInfo"]["hasNextPage"], false);
}

#[actix_web::test]
async fn platform_outages_are_bad_gateways() {
    prepare_test_env();
    let db = seeded_database();
    let mut shop = MockShopPlatform::new();
    shop.expect_get_product().returning(|_, _| Err(AdapterError::Upstream("HTTP 503 from shopify".into())));
    let req = TestRequest::get().uri("/api/shops/1/products/10/11");
    let (status, body) = send(&db, MockAdapters::with_shop(shop), req).await.unwrap();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json(&body)["error"].as_str().unwrap().contains("HTTP 503"));
}

#[actix_web::test]
async fn only_shops_and_channels_have_webhooks() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::get().uri("/api/links/1/webhooks");
    let (status, _) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = TestRequest::get().uri("/api/shops/5/webhooks");
    let (status, _) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn webhooks_are_listed() {
    prepare_test_env();
    let db = seeded_database();
    let mut shop = MockShopPlatform::new();
    shop.expect_get_webhooks().returning(|| {
        Ok(vec![Webhook {
            id: "wh_1".into(),
            callback_url: "/api/handlers/shop/create-order/1".into(),
            topic: WebhookEvent::OrderCreated,
        }])
    });
    let (status, body) =
        send(&db, MockAdapters::with_shop(shop), TestRequest::get().uri("/api/shops/1/webhooks")).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let hooks = json(&body);
    assert_eq!(hooks[0]["id"], "wh_1");
    assert_eq!(hooks[0]["topic"], "ORDER_CREATED");
}

#[actix_web::test]
async fn unsupported_topics_cannot_be_subscribed() {
    prepare_test_env();
    let db = seeded_database();
    let mut shop = MockShopPlatform::new();
    shop.expect_create_webhook().returning(|_, _| {
        Err(AdapterError::UnsupportedTopic { platform: "shopify".into(), event: WebhookEvent::TrackingCreated })
    });
    let req = TestRequest::post().uri("/api/shops/1/webhooks").set_json(value!({
        "endpoint": "/api/handlers/channel/create-tracking/1",
        "events": ["TRACKING_CREATED"]
    }));
    let (status, _) = send(&db, MockAdapters::with_shop(shop), req).await.unwrap();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn deleting_an_unknown_webhook_is_not_found() {
    prepare_test_env();
    let db = seeded_database();
    let mut channel = MockChannelPlatform::new();
    channel.expect_delete_webhook().withf(|id| id == "wh_9").returning(|_| Ok(false));
    let req = TestRequest::delete().uri("/api/channels/1/webhooks/wh_9");
    let (status, _) = send(&db, MockAdapters::with_channel(channel), req).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}
