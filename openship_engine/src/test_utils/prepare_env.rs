use log::*;
use platform_tools::{
    data_objects::{LineItem, Order},
    PlatformCredentials,
    PlatformKind,
};
use serde_json::json;

use crate::{
    db_types::{LinkMode, MatchItem, NewChannel, NewLink, NewMatch, NewShop},
    link_matcher::{Filter, FilterKind, OrderField},
    MemoryDatabase,
    SeedData,
};

pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// A Shopify shop (#1) linked to a WooCommerce supplier (#1) for US orders, plus a 1:1 match of the shop's
/// terrarium (10/11) to the supplier's (70/71).
pub fn sample_seed() -> SeedData {
    let shop_creds = PlatformCredentials::new("plants.myshopify.com", "shpat_test");
    let channel_creds = PlatformCredentials::new("supplier.example.com", "ck_test").with_secret("cs_test");
    let us_only = Filter::new(OrderField::Country, FilterKind::Equals, json!("US"));
    SeedData {
        shops: vec![NewShop::new("Plants", PlatformKind::Shopify, shop_creds)],
        channels: vec![
            NewChannel::new("Supplier", PlatformKind::WooCommerce, channel_creds).with_link_mode(LinkMode::Sequential)
        ],
        links: vec![NewLink::new(1, 1, 1).with_filters(vec![us_only])],
        matches: vec![NewMatch::new(vec![MatchItem::new(1, "10", "11", 1)], vec![MatchItem::new(1, "70", "71", 1)])],
    }
}

pub fn seeded_database() -> MemoryDatabase {
    match MemoryDatabase::from_seed(sample_seed()) {
        Ok(db) => db,
        Err(e) => panic!("Sample seed data is invalid. {e}"),
    }
}

/// A US order for two of the sample shop's terrariums.
pub fn sample_order(order_id: &str) -> Order {
    Order {
        order_id: order_id.to_string(),
        order_name: format!("#{order_id}"),
        email: Some("ana@example.com".into()),
        first_name: Some("Ana".into()),
        last_name: Some("Silva".into()),
        street_address1: Some("1 Main St".into()),
        city: Some("Springfield".into()),
        state: Some("IL".into()),
        zip: Some("62701".into()),
        country: Some("US".into()),
        currency: "USD".into(),
        total_price: "40.00".into(),
        line_items: vec![LineItem {
            name: "Terrarium".into(),
            product_id: "10".into(),
            variant_id: "11".into(),
            quantity: 2,
            price: "20.00".into(),
            ..Default::default()
        }],
        ..Default::default()
    }
}
