use cucumber::World;
use log::*;
use openship_engine::{db_types::RouteDecision, MemoryDatabase, RoutingApi, RoutingError, StoreApi};
use platform_tools::data_objects::Order;

#[derive(Default, Debug, World)]
pub struct RoutingWorld {
    pub system: Option<RoutingSystem>,
    pub order: Order,
    pub decisions: Vec<RouteDecision>,
    pub error: Option<RoutingError>,
}

#[derive(Debug)]
pub struct RoutingSystem {
    pub store: StoreApi<MemoryDatabase>,
    pub routing: RoutingApi<MemoryDatabase>,
}

impl RoutingWorld {
    pub fn system(&self) -> &RoutingSystem {
        self.system.as_ref().expect("Routing system not initialised")
    }
}

impl RoutingSystem {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        debug!("🚀️ Created in-memory database");
        Self { store: StoreApi::new(db.clone()), routing: RoutingApi::new(db) }
    }
}
