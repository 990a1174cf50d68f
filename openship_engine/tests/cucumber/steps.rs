use cucumber::{given, then, when};
use platform_tools::data_objects::{LineItem, Order};

use crate::cucumber::RoutingWorld;

#[when(expr = "shop {int} sends an order to {string} for {string}")]
async fn receive_order(world: &mut RoutingWorld, shop_id: i64, country: String, total: String) {
    let order = Order {
        order_id: "5001".into(),
        order_name: "#1001".into(),
        country: Some(country),
        currency: "USD".into(),
        total_price: total,
        line_items: world.order.line_items.clone(),
        ..Default::default()
    };
    route(world, shop_id, order).await;
}

#[given(expr = "the order contains {int} of {string} with sku {string}")]
async fn order_contains(world: &mut RoutingWorld, quantity: i64, name: String, sku: String) {
    world.order.line_items.push(LineItem { name, quantity, sku: Some(sku), ..Default::default() });
}

async fn route(world: &mut RoutingWorld, shop_id: i64, order: Order) {
    match world.system().routing.route_order(shop_id, &order).await {
        Ok(decisions) => world.decisions = decisions,
        Err(e) => world.error = Some(e),
    }
    world.order = order;
}

#[then(expr = "the order is routed by links {string}")]
async fn routed_by(world: &mut RoutingWorld, links: String) {
    let expected = links.split(',').map(|s| s.trim().parse::<i64>().expect("Not a link id")).collect::<Vec<_>>();
    let actual = world.decisions.iter().map(|d| d.link_id).collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[then(expr = "the order is routed to channel {int}")]
async fn routed_to(world: &mut RoutingWorld, channel_id: i64) {
    assert!(world.decisions.iter().any(|d| d.channel_id == channel_id), "Not routed to channel #{channel_id}");
}

#[then("the order is not routed")]
async fn not_routed(world: &mut RoutingWorld) {
    assert!(world.error.is_none(), "Routing failed: {:?}", world.error);
    assert!(world.decisions.is_empty(), "Unexpected routes: {:?}", world.decisions);
}
