use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use openship_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    AdapterFactory,
    CatalogApi,
    InventorySyncApi,
    MemoryDatabase,
    OAuthApi,
    OrderFlowApi,
    PlatformClients,
    RoutingApi,
    RoutingDatabase,
    StoreApi,
    WebhookApi,
};
use platform_tools::AdapterConfig;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AddFilterRoute,
        ChannelCancelPurchaseRoute,
        ChannelCreateTrackingRoute,
        ChannelLinksRoute,
        ChannelsRoute,
        CreateChannelRoute,
        CreateLinkRoute,
        CreateMatchRoute,
        CreateShopRoute,
        CreateWebhookRoute,
        DeleteChannelRoute,
        DeleteLinkRoute,
        DeleteMatchRoute,
        DeleteShopRoute,
        DeleteWebhookRoute,
        EvaluateLinksRoute,
        MatchesRoute,
        OauthAuthorizeRoute,
        OauthCallbackRoute,
        OauthKeyDeliveryRoute,
        OrderByIdRoute,
        OrdersRoute,
        PlacePurchaseRoute,
        ProductRoute,
        RemoveFilterRoute,
        ReplaceFilterRoute,
        SearchOrdersRoute,
        SearchProductsRoute,
        ShopCancelOrderRoute,
        ShopCreateOrderRoute,
        ShopsRoute,
        SyncInventoryRoute,
        SyncWebhooksRoute,
        UpdateProductRoute,
        WebhooksRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = match &config.seed_file {
        Some(path) => {
            info!("🗃️ Loading seed data from {}", path.display());
            MemoryDatabase::from_seed_file(path).await.map_err(|e| ServerError::InitializeError(e.to_string()))?
        },
        None => MemoryDatabase::new(),
    };
    let handlers = EventHandlers::new(128, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// The hooks the server subscribes to engine events with. For now they only leave a trail in the logs.
fn logging_hooks() -> EventHooks {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_routed(|ev| {
            Box::pin(async move {
                info!(
                    "📬️ Order #{} ({}) routed to channel #{} by link #{}",
                    ev.order.id, ev.order.order.order_name, ev.decision.channel_id, ev.decision.link_id
                );
            })
        })
        .on_purchase_aborted(|ev| {
            Box::pin(async move {
                warn!(
                    "📬️ Purchase for order #{} on channel #{} aborted (draft {:?}, rolled back: {}). {}",
                    ev.order_id, ev.channel_id, ev.purchase_id, ev.compensated, ev.reason
                );
            })
        });
    hooks
}

pub fn create_server_instance(
    config: ServerConfig,
    db: MemoryDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let adapter_config = Arc::clone(&config.adapters);
    let srv = HttpServer::new(move || {
        let adapters = PlatformClients::new(Arc::clone(&adapter_config));
        let api_data = api_data(db.clone(), adapters, producers.clone(), Arc::clone(&adapter_config));
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("osp::access_log"))
            .service(health)
            .service(web::scope("/api").configure(api_data).configure(api_routes::<MemoryDatabase, PlatformClients>))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers one instance of every engine API for the routes in [`api_routes`] to use.
pub fn api_data<B, F>(
    db: B,
    adapters: F,
    producers: EventProducers,
    adapter_config: Arc<AdapterConfig>,
) -> impl FnOnce(&mut web::ServiceConfig)
where
    B: RoutingDatabase + Clone + 'static,
    F: AdapterFactory + 'static,
{
    move |cfg| {
        cfg.app_data(web::Data::new(StoreApi::new(db.clone())))
            .app_data(web::Data::new(RoutingApi::new(db.clone())))
            .app_data(web::Data::new(OrderFlowApi::new(db.clone(), adapters.clone(), producers)))
            .app_data(web::Data::new(InventorySyncApi::new(db.clone(), adapters.clone())))
            .app_data(web::Data::new(CatalogApi::new(db.clone(), adapters.clone())))
            .app_data(web::Data::new(WebhookApi::new(db.clone(), adapters)))
            .app_data(web::Data::new(OAuthApi::new(db, adapter_config)));
    }
}

/// Every route under `/api`.
pub fn api_routes<B, F>(cfg: &mut web::ServiceConfig)
where
    B: RoutingDatabase + 'static,
    F: AdapterFactory + 'static,
{
    // Platform webhooks
    cfg.service(ShopCreateOrderRoute::<B, F>::new())
        .service(ShopCancelOrderRoute::<B, F>::new())
        .service(ChannelCancelPurchaseRoute::<B, F>::new())
        .service(ChannelCreateTrackingRoute::<B, F>::new())
        // OAuth
        .service(OauthAuthorizeRoute::<B>::new())
        .service(OauthCallbackRoute::<B>::new())
        .service(OauthKeyDeliveryRoute::<B>::new())
        // Records
        .service(ShopsRoute::<B>::new())
        .service(CreateShopRoute::<B>::new())
        .service(DeleteShopRoute::<B>::new())
        .service(ChannelsRoute::<B>::new())
        .service(CreateChannelRoute::<B>::new())
        .service(DeleteChannelRoute::<B>::new())
        .service(ChannelLinksRoute::<B>::new())
        .service(EvaluateLinksRoute::<B>::new())
        .service(CreateLinkRoute::<B>::new())
        .service(DeleteLinkRoute::<B>::new())
        .service(AddFilterRoute::<B>::new())
        .service(ReplaceFilterRoute::<B>::new())
        .service(RemoveFilterRoute::<B>::new())
        .service(MatchesRoute::<B>::new())
        .service(CreateMatchRoute::<B>::new())
        .service(DeleteMatchRoute::<B>::new())
        .service(SyncInventoryRoute::<B, F>::new())
        .service(OrdersRoute::<B>::new())
        .service(OrderByIdRoute::<B>::new())
        .service(PlacePurchaseRoute::<B, F>::new())
        // Platform catalog and webhooks
        .service(SearchProductsRoute::<B, F>::new())
        .service(ProductRoute::<B, F>::new())
        .service(SearchOrdersRoute::<B, F>::new())
        .service(UpdateProductRoute::<B, F>::new())
        .service(WebhooksRoute::<B, F>::new())
        .service(CreateWebhookRoute::<B, F>::new())
        .service(DeleteWebhookRoute::<B, F>::new())
        .service(SyncWebhooksRoute::<B, F>::new());
}
