//! Shopify JSON → canonical records. GraphQL nodes (camelCase) and REST webhook payloads (snake_case) differ in
//! shape, so each has its own mapper.
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    data_objects::{LineItem, Order, OrderStatus, Product},
    helpers::{gid_to_id, json_i64, json_id, json_opt_string, json_price},
};

const DEFAULT_VARIANT_TITLE: &str = "Default Title";

pub fn variant_to_product(node: &Value, domain: &str) -> Product {
    let product = &node["product"];
    let product_id = gid_to_id(product["id"].as_str().unwrap_or_default());
    let variant_id = gid_to_id(node["id"].as_str().unwrap_or_default());
    let product_title = product["title"].as_str().unwrap_or_default();
    let title = match node["title"].as_str() {
        Some(t) if !t.is_empty() && t != DEFAULT_VARIANT_TITLE => format!("{product_title} - {t}"),
        _ => product_title.to_string(),
    };
    let image = json_opt_string(&node["image"]["url"]).or_else(|| json_opt_string(&product["featuredImage"]["url"]));
    Product {
        image,
        title,
        product_link: Some(format!("https://{domain}/admin/products/{product_id}/variants/{variant_id}")),
        product_id,
        variant_id,
        price: json_price(&node["price"]),
        available_for_sale: node["availableForSale"].as_bool().unwrap_or(false),
        inventory: json_i64(&node["inventoryQuantity"]),
        inventory_tracked: node["inventoryItem"]["tracked"].as_bool().unwrap_or(false),
    }
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|d| d.with_timezone(&Utc))
}

pub fn graphql_line_item(node: &Value) -> LineItem {
    LineItem {
        name: node["name"].as_str().unwrap_or_default().to_string(),
        product_id: gid_to_id(node["variant"]["product"]["id"].as_str().unwrap_or_default()),
        variant_id: gid_to_id(node["variant"]["id"].as_str().unwrap_or_default()),
        quantity: json_i64(&node["quantity"]).unwrap_or_default(),
        price: json_price(&node["originalUnitPriceSet"]["shopMoney"]["amount"]),
        image: json_opt_string(&node["image"]["url"]),
        sku: json_opt_string(&node["sku"]),
    }
}

pub fn graphql_order(node: &Value) -> Order {
    let addr = &node["shippingAddress"];
    let line_items = node["lineItems"]["nodes"].as_array().map(|a| a.iter().map(graphql_line_item).collect());
    Order {
        order_id: gid_to_id(node["id"].as_str().unwrap_or_default()),
        order_name: node["name"].as_str().unwrap_or_default().to_string(),
        email: json_opt_string(&node["email"]),
        first_name: json_opt_string(&addr["firstName"]),
        last_name: json_opt_string(&addr["lastName"]),
        street_address1: json_opt_string(&addr["address1"]),
        street_address2: json_opt_string(&addr["address2"]),
        city: json_opt_string(&addr["city"]),
        state: json_opt_string(&addr["provinceCode"]),
        zip: json_opt_string(&addr["zip"]),
        country: json_opt_string(&addr["countryCode"]),
        phone: json_opt_string(&addr["phone"]),
        currency: node["currencyCode"].as_str().unwrap_or_default().to_string(),
        total_price: json_price(&node["totalPriceSet"]["shopMoney"]["amount"]),
        note: json_opt_string(&node["note"]),
        created_at: parse_date(&node["createdAt"]),
        line_items: line_items.unwrap_or_default(),
        cart_items: vec![],
        status: OrderStatus::Pending,
    }
}

/// Maps the REST representation delivered by `orders/create` and `orders/cancelled` webhooks.
pub fn webhook_order(payload: &Value) -> Order {
    let addr = &payload["shipping_address"];
    let line_items = payload["line_items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| LineItem {
                    name: item["name"].as_str().or(item["title"].as_str()).unwrap_or_default().to_string(),
                    product_id: json_id(&item["product_id"]),
                    variant_id: json_id(&item["variant_id"]),
                    quantity: json_i64(&item["quantity"]).unwrap_or_default(),
                    price: json_price(&item["price"]),
                    image: None,
                    sku: json_opt_string(&item["sku"]),
                })
                .collect()
        })
        .unwrap_or_default();
    Order {
        order_id: json_id(&payload["id"]),
        order_name: payload["name"].as_str().unwrap_or_default().to_string(),
        email: json_opt_string(&payload["email"]).or_else(|| json_opt_string(&payload["contact_email"])),
        first_name: json_opt_string(&addr["first_name"]),
        last_name: json_opt_string(&addr["last_name"]),
        street_address1: json_opt_string(&addr["address1"]),
        street_address2: json_opt_string(&addr["address2"]),
        city: json_opt_string(&addr["city"]),
        state: json_opt_string(&addr["province_code"]),
        zip: json_opt_string(&addr["zip"]),
        country: json_opt_string(&addr["country_code"]),
        phone: json_opt_string(&addr["phone"]),
        currency: payload["currency"].as_str().unwrap_or_default().to_string(),
        total_price: json_price(&payload["total_price"]),
        note: json_opt_string(&payload["note"]),
        created_at: parse_date(&payload["created_at"]),
        line_items,
        cart_items: vec![],
        status: OrderStatus::Pending,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn webhook_order_maps_shipping_and_items() {
        let payload: Value = serde_json::from_str(include_str!("./test_assets/order_created.json")).unwrap();
        let order = webhook_order(&payload);
        assert_eq!(order.order_id, "820982911946154508");
        assert_eq!(order.order_name, "#9999");
        assert_eq!(order.email.as_deref(), Some("jon@example.com"));
        assert_eq!(order.first_name.as_deref(), Some("Steve"));
        assert_eq!(order.state.as_deref(), Some("KY"));
        assert_eq!(order.country.as_deref(), Some("US"));
        assert_eq!(order.total_price, "403.00");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].variant_id, "808950810");
        assert_eq!(order.line_items[1].quantity, 2);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn default_variant_title_is_hidden() {
        let node = serde_json::json!({
            "id": "gid://shopify/ProductVariant/11", "title": "Default Title", "price": "5.00",
            "product": {"id": "gid://shopify/Product/2", "title": "Mug"}
        });
        let product = variant_to_product(&node, "shop.myshopify.com");
        assert_eq!(product.title, "Mug");
        assert_eq!(product.product_link.as_deref(), Some("https://shop.myshopify.com/admin/products/2/variants/11"));
    }
}
