use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    data_objects::{LineItem, Order, OrderStatus, Product},
    helpers::{json_i64, json_id, json_opt_string, json_price},
};

/// Order status id BigCommerce uses for "Cancelled".
pub const STATUS_CANCELLED: i64 = 5;
/// Order status id for "Awaiting Fulfillment", used for purchases placed by Openship.
pub const STATUS_AWAITING_FULFILLMENT: i64 = 11;

/// Expands a v3 catalog product (fetched with `include=variants,images`) into one [`Product`] per variant.
pub fn catalog_products(product: &Value, store_hash: &str) -> Vec<Product> {
    let product_id = json_id(&product["id"]);
    let name = product["name"].as_str().unwrap_or_default();
    let tracked = product["inventory_tracking"].as_str().map(|t| t != "none").unwrap_or(false);
    let available = product["availability"].as_str().map(|a| a == "available").unwrap_or(true);
    let product_image = product["images"]
        .as_array()
        .and_then(|images| {
            images.iter().find(|i| i["is_thumbnail"].as_bool().unwrap_or(false)).or_else(|| images.first())
        })
        .and_then(|i| json_opt_string(&i["url_standard"]));
    let link = format!("https://store-{store_hash}.mybigcommerce.com/manage/products/edit/{product_id}");
    let variants = product["variants"].as_array().cloned().unwrap_or_default();
    variants
        .iter()
        .map(|v| {
            let options = v["option_values"]
                .as_array()
                .map(|o| o.iter().filter_map(|ov| ov["label"].as_str()).collect::<Vec<_>>().join(" / "))
                .unwrap_or_default();
            let title = if options.is_empty() { name.to_string() } else { format!("{name} - {options}") };
            let price = [&v["price"], &v["calculated_price"], &product["price"]]
                .into_iter()
                .find(|p| !p.is_null())
                .map(json_price)
                .unwrap_or_else(|| "0.00".to_string());
            let inventory = if tracked {
                json_i64(&v["inventory_level"]).or_else(|| json_i64(&product["inventory_level"]))
            } else {
                None
            };
            Product {
                image: json_opt_string(&v["image_url"]).or_else(|| product_image.clone()),
                title,
                product_id: product_id.clone(),
                variant_id: json_id(&v["id"]),
                price,
                available_for_sale: available && !v["purchasing_disabled"].as_bool().unwrap_or(false),
                inventory,
                inventory_tracked: tracked,
                product_link: Some(link.clone()),
            }
        })
        .collect()
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(|s| DateTime::parse_from_rfc2822(s).ok()).map(|d| d.with_timezone(&Utc))
}

pub fn order_line_item(product: &Value) -> LineItem {
    LineItem {
        name: product["name"].as_str().unwrap_or_default().to_string(),
        product_id: json_id(&product["product_id"]),
        variant_id: json_id(&product["variant_id"]),
        quantity: json_i64(&product["quantity"]).unwrap_or_default(),
        price: json_price(&product["price_inc_tax"]),
        image: None,
        sku: json_opt_string(&product["sku"]),
    }
}

/// Builds a canonical order from the v2 order, its products and its shipping addresses.
pub fn v2_order(order: &Value, products: &[Value], shipping: &[Value]) -> Order {
    let billing = &order["billing_address"];
    let addr = shipping.first().unwrap_or(billing);
    let status = match json_i64(&order["status_id"]) {
        Some(STATUS_CANCELLED) => OrderStatus::Cancelled,
        _ => OrderStatus::Pending,
    };
    Order {
        order_id: json_id(&order["id"]),
        order_name: format!("#{}", json_id(&order["id"])),
        email: json_opt_string(&addr["email"]).or_else(|| json_opt_string(&billing["email"])),
        first_name: json_opt_string(&addr["first_name"]),
        last_name: json_opt_string(&addr["last_name"]),
        street_address1: json_opt_string(&addr["street_1"]),
        street_address2: json_opt_string(&addr["street_2"]),
        city: json_opt_string(&addr["city"]),
        state: json_opt_string(&addr["state"]),
        zip: json_opt_string(&addr["zip"]),
        country: json_opt_string(&addr["country_iso2"]),
        phone: json_opt_string(&addr["phone"]),
        currency: order["currency_code"].as_str().unwrap_or_default().to_string(),
        total_price: json_price(&order["total_inc_tax"]),
        note: json_opt_string(&order["customer_message"]),
        created_at: parse_date(&order["date_created"]),
        line_items: products.iter().map(order_line_item).collect(),
        cart_items: vec![],
        status,
    }
}
