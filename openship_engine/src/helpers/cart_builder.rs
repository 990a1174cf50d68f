//! Turns the line items of a shop order into cart items for a channel, using the stored matches.
//!
//! A match applies to an order when every one of its input items appears among the order's line items (same shop,
//! product and variant) in at least the matched quantity. The match then applies as many whole times as the scarcest
//! input allows, and each output item on the channel becomes a cart item with its quantity scaled accordingly.
use log::*;
use platform_tools::data_objects::{CartItem, CartItemStatus, Order};

use crate::db_types::{Match, MatchItem};

fn ordered_quantity(order: &Order, item: &MatchItem) -> i64 {
    order
        .line_items
        .iter()
        .filter(|l| l.product_id == item.product_id && l.variant_id == item.variant_id)
        .map(|l| l.quantity)
        .sum()
}

/// How many whole times `m` applies to an order from `shop_id`. Zero when it does not apply.
pub fn match_multiplier(m: &Match, shop_id: i64, order: &Order) -> i64 {
    if m.input.is_empty() || m.input.iter().any(|i| i.platform_id != shop_id) {
        return 0;
    }
    m.input.iter().map(|i| ordered_quantity(order, i) / i.quantity.max(1)).min().unwrap_or(0)
}

fn cart_item(channel_id: i64, output: &MatchItem, multiplier: i64) -> CartItem {
    let details = output.external_details.clone().unwrap_or_default();
    CartItem {
        channel_id,
        name: details.title,
        product_id: output.product_id.clone(),
        variant_id: output.variant_id.clone(),
        quantity: output.quantity * multiplier,
        price: if details.price.is_empty() { "0.00".to_string() } else { details.price },
        image: details.image,
        sku: None,
        purchase_id: None,
        status: CartItemStatus::Pending,
        tracking: None,
    }
}

pub fn cart_items_for_channel(order: &Order, shop_id: i64, channel_id: i64, matches: &[Match]) -> Vec<CartItem> {
    let mut items = Vec::new();
    for m in matches {
        let multiplier = match_multiplier(m, shop_id, order);
        if multiplier == 0 {
            continue;
        }
        let outputs = m.output.iter().filter(|o| o.platform_id == channel_id).collect::<Vec<_>>();
        trace!("🛒️ Match #{} applies {multiplier}x to order {} ({} items)", m.id, order.order_name, outputs.len());
        items.extend(outputs.into_iter().map(|o| cart_item(channel_id, o, multiplier)));
    }
    items
}
