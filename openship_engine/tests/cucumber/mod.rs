mod routing_world;
mod setups;
mod steps;

pub use routing_world::RoutingWorld;
