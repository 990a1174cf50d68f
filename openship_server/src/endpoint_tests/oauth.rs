use actix_web::{http::StatusCode, test::TestRequest};
use openship_engine::{
    test_utils::prepare_env::{prepare_test_env, seeded_database},
    RoutingDatabase,
};
use platform_tools::{signature::issue_state, AdapterConfig};
use serde_json::json as value;

use super::{
    helpers::{json, send, send_with_config},
    mocks::MockAdapters,
};

fn config_with_state_secret() -> AdapterConfig {
    let mut config = AdapterConfig::default();
    config.oauth_state_secret = "state-secret".into();
    config
}

#[actix_web::test]
async fn authorize_urls_point_at_the_store() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::get().uri("/api/oauth/shopify/authorize?domain=plants.myshopify.com");
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let url = json(&body);
    let auth_url = url["authUrl"].as_str().unwrap();
    assert!(auth_url.starts_with("https://plants.myshopify.com/admin/oauth/authorize?"));
    assert!(auth_url.contains("oauth%2Fshopify%2Fcallback"));
    assert!(!url["state"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn unknown_platforms_are_bad_requests() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::get().uri("/api/oauth/magento/authorize?domain=plants.example.com");
    let (status, _) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn unsigned_callbacks_are_rejected() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::get().uri("/api/oauth/shopify/callback?shop=plants.myshopify.com&code=abc");
    let (status, _) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let shop = db.fetch_shop(1).await.unwrap().unwrap();
    assert_eq!(shop.credentials.access_token.reveal(), "shpat_test");
}

#[actix_web::test]
async fn callbacks_must_name_the_store() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::get().uri("/api/oauth/bigcommerce/callback?code=abc");
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("does not say which store"));
}

#[actix_web::test]
async fn woocommerce_key_deliveries_update_the_store() {
    prepare_test_env();
    let db = seeded_database();
    let state = issue_state("state-secret").unwrap();
    let req = TestRequest::post().uri("/api/oauth/woocommerce/callback?shop=supplier.example.com").set_json(value!({
        "key_id": 41,
        "user_id": state,
        "consumer_key": "ck_fresh",
        "consumer_secret": "cs_fresh",
        "key_permissions": "read_write"
    }));
    let (status, body) = send_with_config(&db, MockAdapters::unused(), config_with_state_secret(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let update = json(&body);
    assert_eq!(update["channels"], value!([1]));
    assert_eq!(update["shops"], value!([]));

    let channel = db.fetch_channel(1).await.unwrap().unwrap();
    assert_eq!(channel.credentials.access_token.reveal(), "ck_fresh");
    assert_eq!(channel.credentials.access_secret.as_ref().map(|s| s.reveal().as_str()), Some("cs_fresh"));
}

#[actix_web::test]
async fn key_deliveries_with_a_forged_state_are_rejected() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::post().uri("/api/oauth/woocommerce/callback?shop=supplier.example.com").set_json(value!({
        "key_id": 41,
        "user_id": "0011.1700000000.deadbeef",
        "consumer_key": "ck_forged",
        "consumer_secret": "cs_forged",
        "key_permissions": "read_write"
    }));
    let (status, _) = send_with_config(&db, MockAdapters::unused(), config_with_state_secret(), req).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let channel = db.fetch_channel(1).await.unwrap().unwrap();
    assert_eq!(channel.credentials.access_token.reveal(), "ck_test");
}
