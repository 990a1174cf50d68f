use actix_web::{http::StatusCode, test::TestRequest};
use openship_engine::{
    test_utils::prepare_env::{prepare_test_env, sample_order, seeded_database},
    RoutingDatabase,
};
use serde_json::json as value;

use super::{
    helpers::{json, send},
    mocks::MockAdapters,
};

#[actix_web::test]
async fn created_shops_hide_their_credentials() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::post().uri("/api/shops").set_json(value!({
        "name": "Outlet",
        "platform": "woocommerce",
        "credentials": { "domain": "outlet.example.com", "access_token": "ck_live", "access_secret": "cs_live" }
    }));
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("ck_live"));
    let shop = json(&body);
    assert_eq!(shop["id"], 2);
    assert_eq!(shop["platform"], "woocommerce");
    assert_eq!(shop["credentials"]["access_token"], "****");

    let stored = db.fetch_shop(2).await.unwrap().unwrap();
    assert_eq!(stored.credentials.access_token.reveal(), "ck_live");
}

#[actix_web::test]
async fn deleting_a_missing_shop_is_not_found() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::delete().uri("/api/shops/7");
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "The data was not found. Shop #7 does not exist");
}

#[actix_web::test]
async fn deleting_a_channel_removes_its_links() {
    prepare_test_env();
    let db = seeded_database();
    let (status, _) =
        send(&db, MockAdapters::unused(), TestRequest::delete().uri("/api/channels/1")).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert!(db.fetch_link(1).await.unwrap().is_none());
    let (status, _) = send(&db, MockAdapters::unused(), TestRequest::get().uri("/api/channels/1/links")).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn filter_edits_need_the_current_version() {
    prepare_test_env();
    let db = seeded_database();
    let edit = || {
        TestRequest::post().uri("/api/links/1/filters").set_json(value!({
            "expectedVersion": 0,
            "filter": { "field": "currency", "type": "equals", "value": "USD" }
        }))
    };
    let (status, body) = send(&db, MockAdapters::unused(), edit()).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let link = json(&body);
    assert_eq!(link["version"], 1);
    assert_eq!(link["filters"].as_array().unwrap().len(), 2);

    // A second editor still looking at version 0
    let (status, _) = send(&db, MockAdapters::unused(), edit()).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);

    let req = TestRequest::delete().uri("/api/links/1/filters/0?version=1");
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["filters"][0]["field"], "currency");
}

#[actix_web::test]
async fn invalid_filters_are_bad_requests() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::put().uri("/api/links/1/filters/0").set_json(value!({
        "expectedVersion": 0,
        "filter": { "field": "country", "type": "in", "value": "US" }
    }));
    let (status, _) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(db.fetch_link(1).await.unwrap().unwrap().version, 0);
}

#[actix_web::test]
async fn orders_can_be_tried_against_a_channel() {
    prepare_test_env();
    let db = seeded_database();
    let mut order = sample_order("6001");
    let req = TestRequest::post().uri("/api/channels/1/route").set_json(value!({ "shopId": 1, "order": order }));
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)[0]["id"], 1);

    order.country = Some("CA".into());
    let req = TestRequest::post().uri("/api/channels/1/route").set_json(value!({ "shopId": 1, "order": order }));
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), value!([]));
    // Nothing is stored
    assert!(db.fetch_orders().await.unwrap().is_empty());
}

#[actix_web::test]
async fn inventory_sync_reports_each_match() {
    prepare_test_env();
    let db = seeded_database();
    let req = TestRequest::post().uri("/api/inventory/sync").set_json(value!({ "matchIds": [9] }));
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let report = json(&body);
    assert_eq!(report["failures"][0]["matchId"], 9);
    assert_eq!(report["synced"], value!([]));
    assert_eq!(report["states"], value!({ "9": "pending" }));
}

#[actix_web::test]
async fn purchases_need_pending_items() {
    prepare_test_env();
    let db = seeded_database();
    // Stored without going through routing, so it has no cart
    db.insert_order(1, sample_order("7001")).await.unwrap();
    let req = TestRequest::post().uri("/api/orders/1/purchase/1");
    let (status, body) = send(&db, MockAdapters::unused(), req).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json(&body)["error"].as_str().unwrap().contains("no pending items"));

    let (status, _) =
        send(&db, MockAdapters::unused(), TestRequest::post().uri("/api/orders/4/purchase/1")).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}
