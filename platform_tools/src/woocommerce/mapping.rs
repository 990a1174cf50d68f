use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::{
    data_objects::{LineItem, Order, OrderStatus, Product},
    helpers::{json_i64, json_id, json_opt_string, json_price},
};

pub const STATUS_CANCELLED: &str = "cancelled";

/// Maps a product, or one of its variations when `variation` is given.
pub fn product(product: &Value, variation: Option<&Value>) -> Product {
    let product_id = json_id(&product["id"]);
    let source = variation.unwrap_or(product);
    let variant_id = variation.map(|v| json_id(&v["id"])).unwrap_or_else(|| product_id.clone());
    let name = product["name"].as_str().unwrap_or_default();
    let title = match variation.and_then(|v| v["attributes"].as_array()) {
        Some(attrs) if !attrs.is_empty() => {
            let options = attrs.iter().filter_map(|a| a["option"].as_str()).collect::<Vec<_>>().join(" / ");
            format!("{name} - {options}")
        },
        _ => name.to_string(),
    };
    let image = json_opt_string(&source["image"]["src"]).or_else(|| json_opt_string(&product["images"][0]["src"]));
    let tracked = source["manage_stock"].as_bool().unwrap_or(false);
    Product {
        image,
        title,
        product_id,
        variant_id,
        price: json_price(&source["price"]),
        available_for_sale: source["stock_status"].as_str().map(|s| s != "outofstock").unwrap_or(true) &&
            source["purchasable"].as_bool().unwrap_or(true),
        inventory: if tracked { json_i64(&source["stock_quantity"]) } else { None },
        inventory_tracked: tracked,
        product_link: json_opt_string(&source["permalink"]),
    }
}

fn parse_gmt(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok())
        .map(|d| DateTime::<Utc>::from_naive_utc_and_offset(d, Utc))
}

pub fn line_item(item: &Value) -> LineItem {
    let variation_id = json_id(&item["variation_id"]);
    let product_id = json_id(&item["product_id"]);
    LineItem {
        name: item["name"].as_str().unwrap_or_default().to_string(),
        variant_id: if variation_id.is_empty() || variation_id == "0" { product_id.clone() } else { variation_id },
        product_id,
        quantity: json_i64(&item["quantity"]).unwrap_or_default(),
        price: json_price(&item["price"]),
        image: json_opt_string(&item["image"]["src"]),
        sku: json_opt_string(&item["sku"]),
    }
}

pub fn order(order: &Value) -> Order {
    let shipping = &order["shipping"];
    let billing = &order["billing"];
    let field = |name: &str| json_opt_string(&shipping[name]).or_else(|| json_opt_string(&billing[name]));
    let status = match order["status"].as_str() {
        Some(STATUS_CANCELLED) => OrderStatus::Cancelled,
        Some("completed") => OrderStatus::Complete,
        _ => OrderStatus::Pending,
    };
    Order {
        order_id: json_id(&order["id"]),
        order_name: format!("#{}", json_opt_string(&order["number"]).unwrap_or_else(|| json_id(&order["id"]))),
        email: json_opt_string(&billing["email"]),
        first_name: field("first_name"),
        last_name: field("last_name"),
        street_address1: field("address_1"),
        street_address2: field("address_2"),
        city: field("city"),
        state: field("state"),
        zip: field("postcode"),
        country: field("country"),
        phone: field("phone"),
        currency: order["currency"].as_str().unwrap_or_default().to_string(),
        total_price: json_price(&order["total"]),
        note: json_opt_string(&order["customer_note"]),
        created_at: parse_gmt(&order["date_created_gmt"]),
        line_items: order["line_items"].as_array().map(|a| a.iter().map(line_item).collect()).unwrap_or_default(),
        cart_items: vec![],
        status,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn orders_fall_back_to_billing_address() {
        let json: Value = serde_json::from_str(include_str!("./test_assets/order.json")).unwrap();
        let order = order(&json);
        assert_eq!(order.order_id, "727");
        assert_eq!(order.order_name, "#727");
        assert_eq!(order.email.as_deref(), Some("john.doe@example.com"));
        assert_eq!(order.first_name.as_deref(), Some("John"));
        assert_eq!(order.phone.as_deref(), Some("(555) 555-5555"));
        assert_eq!(order.street_address2, None);
        assert_eq!(order.total_price, "29.35");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].variant_id, "93");
        assert_eq!(order.line_items[1].variant_id, "24");
        assert_eq!(order.created_at.map(|d| d.to_rfc3339()).as_deref(), Some("2024-05-21T14:15:05+00:00"));
    }

    #[test]
    fn variations_carry_their_attributes() {
        let parent = serde_json::json!({"id": 22, "name": "Ship Your Idea", "images": [{"src": "https://woo.test/a.jpg"}]});
        let variation = serde_json::json!({"id": 24, "price": "20", "manage_stock": true, "stock_quantity": 3,
            "stock_status": "instock", "attributes": [{"name": "Color", "option": "Black"}]});
        let p = product(&parent, Some(&variation));
        assert_eq!(p.title, "Ship Your Idea - Black");
        assert_eq!(p.variant_id, "24");
        assert_eq!(p.inventory, Some(3));
        assert_eq!(p.image.as_deref(), Some("https://woo.test/a.jpg"));
    }
}
