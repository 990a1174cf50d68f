use cucumber::{gherkin::Step, given};
use openship_engine::{
    db_types::{LinkMode, NewChannel, NewLink, NewShop},
    link_matcher::Filter,
};
use platform_tools::{PlatformCredentials, PlatformKind};

use crate::cucumber::{routing_world::RoutingSystem, RoutingWorld};

#[given("a fresh install")]
async fn fresh_install(world: &mut RoutingWorld) {
    world.system = Some(RoutingSystem::new());
}

#[given(expr = "a {word} shop called {string}")]
async fn a_shop(world: &mut RoutingWorld, platform: String, name: String) {
    let platform = platform.parse::<PlatformKind>().expect("Unknown platform");
    let creds = PlatformCredentials::new(format!("{name}.example.com"), "token".to_string());
    world.system().store.create_shop(NewShop::new(name, platform, creds)).await.expect("Error creating shop");
}

#[given(expr = "a {word} channel called {string} in {word} mode")]
async fn a_channel(world: &mut RoutingWorld, platform: String, name: String, mode: String) {
    let platform = platform.parse::<PlatformKind>().expect("Unknown platform");
    let mode = serde_json::from_value::<LinkMode>(serde_json::Value::String(mode)).expect("Unknown link mode");
    let creds = PlatformCredentials::new(format!("{name}.example.com"), "token".to_string());
    let channel = NewChannel::new(name, platform, creds).with_link_mode(mode);
    world.system().store.create_channel(channel).await.expect("Error creating channel");
}

#[given(expr = "a link from shop {int} to channel {int} at rank {int}")]
async fn a_link(world: &mut RoutingWorld, shop_id: i64, channel_id: i64, rank: i64) {
    world.system().store.create_link(NewLink::new(channel_id, shop_id, rank)).await.expect("Error creating link");
}

#[given(expr = "link {int} has the filters")]
async fn link_filters(world: &mut RoutingWorld, step: &Step, link_id: i64) {
    let json = step.docstring.as_ref().expect("Filters must be given as a docstring");
    let filters = serde_json::from_str::<Vec<Filter>>(json).expect("Invalid filter JSON");
    let store = &world.system().store;
    for filter in filters {
        let version = store.link(link_id).await.expect("Unknown link").version;
        store.add_filter(link_id, version, filter).await.expect("Error adding filter");
    }
}
