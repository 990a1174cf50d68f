//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate function. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. platform calls) should be expressed as futures or
//! asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block execution.
//!
//! Webhook handlers (`/api/handlers/...`) answer `401` when a delivery's signature does not verify and `200` with a
//! [`JsonResponse`] otherwise, so that the platforms do not retry deliveries that failed for business reasons. The
//! admin routes map errors onto `4xx`/`5xx` responses with an `{ "error": ... }` body.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use bytes::Bytes;
use log::*;
use openship_engine::{
    db_types::{NewChannel, NewLink, NewMatch, NewShop},
    AdapterFactory,
    CatalogApi,
    InventorySyncApi,
    OAuthApi,
    OrderFlowApi,
    OrderFlowError,
    RoutingApi,
    RoutingDatabase,
    StoreApi,
    WebhookApi,
};
use platform_tools::{
    data_objects::{OAuthCallbackParams, UpdateProductRequest},
    AdapterError,
};

use crate::{
    data_objects::{
        AuthorizeParams,
        FilterUpdate,
        InventorySyncParams,
        JsonResponse,
        KeyDelivery,
        NewWebhook,
        RouteQuery,
        SearchParams,
        VersionParam,
    },
    errors::ServerError,
    helpers::{platform_kind, platform_ref, webhook_request},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Webhook handlers  ----------------------------------------------
fn webhook_response<T>(
    result: Result<T, OrderFlowError>,
    message: impl FnOnce(T) -> String,
) -> Result<HttpResponse, ServerError> {
    match result {
        Ok(value) => Ok(HttpResponse::Ok().json(JsonResponse::success(message(value)))),
        Err(OrderFlowError::Adapter(AdapterError::InvalidSignature(e))) => {
            warn!("🪝️ Rejected webhook delivery. {e}");
            Err(ServerError::InvalidSignature(e))
        },
        Err(e) => {
            warn!("🪝️ Could not process webhook delivery. {e}");
            Ok(HttpResponse::Ok().json(JsonResponse::failure(e)))
        },
    }
}

route!(shop_create_order => Post "/handlers/shop/create-order/{shop_id}" impl RoutingDatabase, AdapterFactory);
/// `ORDER_CREATED` deliveries from a shop. The order is stored, routed and carted.
pub async fn shop_create_order<B, F>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: Bytes,
    api: web::Data<OrderFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let shop_id = path.into_inner();
    trace!("🪝️ Received order webhook for shop #{shop_id}");
    let result = api.process_order_webhook(shop_id, &webhook_request(&req, body)).await;
    webhook_response(result, |record| format!("Order {} saved as #{}", record.order.order_name, record.id))
}

route!(shop_cancel_order => Post "/handlers/shop/cancel-order/{shop_id}" impl RoutingDatabase, AdapterFactory);
pub async fn shop_cancel_order<B, F>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: Bytes,
    api: web::Data<OrderFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let shop_id = path.into_inner();
    trace!("🪝️ Received cancellation webhook for shop #{shop_id}");
    let result = api.cancel_order_webhook(shop_id, &webhook_request(&req, body)).await;
    webhook_response(result, |record| match record {
        Some(record) => format!("Order #{} cancelled", record.id),
        None => "Nothing to cancel".to_string(),
    })
}

route!(channel_cancel_purchase =>
    Post "/handlers/channel/cancel-purchase/{channel_id}" impl RoutingDatabase, AdapterFactory);
pub async fn channel_cancel_purchase<B, F>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: Bytes,
    api: web::Data<OrderFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let channel_id = path.into_inner();
    trace!("🪝️ Received purchase cancellation webhook for channel #{channel_id}");
    let result = api.purchase_cancelled_webhook(channel_id, &webhook_request(&req, body)).await;
    webhook_response(result, |record| match record {
        Some(record) => format!("Purchase of order #{} cancelled", record.id),
        None => "Nothing to cancel".to_string(),
    })
}

route!(channel_create_tracking =>
    Post "/handlers/channel/create-tracking/{channel_id}" impl RoutingDatabase, AdapterFactory);
pub async fn channel_create_tracking<B, F>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: Bytes,
    api: web::Data<OrderFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let channel_id = path.into_inner();
    trace!("🪝️ Received tracking webhook for channel #{channel_id}");
    let result = api.tracking_webhook(channel_id, &webhook_request(&req, body)).await;
    webhook_response(result, |record| format!("Tracking recorded for order #{}", record.id))
}

//----------------------------------------------   OAuth  ----------------------------------------------------
route!(oauth_authorize => Get "/oauth/{platform}/authorize" impl RoutingDatabase);
/// Returns the vendor URL the merchant must visit to approve the install, along with the signed `state` it carries.
pub async fn oauth_authorize<B: RoutingDatabase>(
    path: web::Path<String>,
    query: web::Query<AuthorizeParams>,
    api: web::Data<OAuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let platform = platform_kind(&path.into_inner())?;
    debug!("🔑️ GET authorize URL for {} on {platform}", query.domain);
    let url = api.authorize_url(platform, &query.domain)?;
    Ok(HttpResponse::Ok().json(url))
}

route!(oauth_callback => Get "/oauth/{platform}/callback" impl RoutingDatabase);
/// The platforms redirect here after the merchant approves the install. The callback is verified before the code is
/// exchanged, and the resulting credentials are stored against every record for the store.
pub async fn oauth_callback<B: RoutingDatabase>(
    path: web::Path<String>,
    query: web::Query<OAuthCallbackParams>,
    api: web::Data<OAuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let platform = platform_kind(&path.into_inner())?;
    debug!("🔑️ GET {platform} OAuth callback");
    let update = api.complete(platform, &query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(update))
}

route!(oauth_key_delivery => Post "/oauth/{platform}/callback" impl RoutingDatabase);
/// WooCommerce posts the generated REST keys to the callback instead of redirecting the merchant to it. The store
/// domain comes from the callback's query string and the keys from the body.
pub async fn oauth_key_delivery<B: RoutingDatabase>(
    path: web::Path<String>,
    query: web::Query<OAuthCallbackParams>,
    body: web::Json<KeyDelivery>,
    api: web::Data<OAuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let platform = platform_kind(&path.into_inner())?;
    let delivery = body.into_inner();
    debug!("🔑️ POST {platform} key delivery (key #{:?}, {:?})", delivery.key_id, delivery.key_permissions);
    let params = delivery.merge_into(query.into_inner());
    let update = api.complete(platform, &params).await?;
    Ok(HttpResponse::Ok().json(update))
}

//----------------------------------------------   Shops  ----------------------------------------------------
route!(shops => Get "/shops" impl RoutingDatabase);
pub async fn shops<B: RoutingDatabase>(api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET shops");
    Ok(HttpResponse::Ok().json(api.shops().await?))
}

route!(create_shop => Post "/shops" impl RoutingDatabase);
pub async fn create_shop<B: RoutingDatabase>(
    body: web::Json<NewShop>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new shop {}", body.name);
    let shop = api.create_shop(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(shop))
}

route!(delete_shop => Delete "/shops/{id}" impl RoutingDatabase);
pub async fn delete_shop<B: RoutingDatabase>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE shop #{id}");
    api.delete_shop(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Shop #{id} deleted"))))
}

//----------------------------------------------   Channels  ----------------------------------------------------
route!(channels => Get "/channels" impl RoutingDatabase);
pub async fn channels<B: RoutingDatabase>(api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET channels");
    Ok(HttpResponse::Ok().json(api.channels().await?))
}

route!(create_channel => Post "/channels" impl RoutingDatabase);
pub async fn create_channel<B: RoutingDatabase>(
    body: web::Json<NewChannel>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new channel {}", body.name);
    let channel = api.create_channel(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(channel))
}

route!(delete_channel => Delete "/channels/{id}" impl RoutingDatabase);
pub async fn delete_channel<B: RoutingDatabase>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE channel #{id}");
    api.delete_channel(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Channel #{id} deleted"))))
}

route!(channel_links => Get "/channels/{id}/links" impl RoutingDatabase);
pub async fn channel_links<B: RoutingDatabase>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET links of channel #{id}");
    Ok(HttpResponse::Ok().json(api.links_for_channel(id).await?))
}

route!(evaluate_links => Post "/channels/{id}/route" impl RoutingDatabase);
/// Runs an order through a channel's links without storing anything. Returns the links that accept it.
pub async fn evaluate_links<B: RoutingDatabase>(
    path: web::Path<i64>,
    body: web::Json<RouteQuery>,
    api: web::Data<RoutingApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let channel_id = path.into_inner();
    let RouteQuery { shop_id, order } = body.into_inner();
    debug!("🔀️ POST evaluate order {} from shop #{shop_id} on channel #{channel_id}", order.order_name);
    let links = api.evaluate_links(channel_id, shop_id, &order).await?;
    Ok(HttpResponse::Ok().json(links))
}

//----------------------------------------------   Links  ----------------------------------------------------
route!(create_link => Post "/links" impl RoutingDatabase);
pub async fn create_link<B: RoutingDatabase>(
    body: web::Json<NewLink>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST new link from shop #{} to channel #{}", body.shop_id, body.channel_id);
    let link = api.create_link(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(link))
}

route!(delete_link => Delete "/links/{id}" impl RoutingDatabase);
pub async fn delete_link<B: RoutingDatabase>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE link #{id}");
    api.delete_link(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Link #{id} deleted"))))
}

route!(add_filter => Post "/links/{id}/filters" impl RoutingDatabase);
/// Appends a filter. Fails with `409` if the link changed since the editor loaded `expectedVersion`.
pub async fn add_filter<B: RoutingDatabase>(
    path: web::Path<i64>,
    body: web::Json<FilterUpdate>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let FilterUpdate { expected_version, filter } = body.into_inner();
    debug!("🔗️ POST filter on {:?} for link #{id} at version {expected_version}", filter.field);
    let link = api.add_filter(id, expected_version, filter).await?;
    Ok(HttpResponse::Ok().json(link))
}

route!(replace_filter => Put "/links/{id}/filters/{index}" impl RoutingDatabase);
pub async fn replace_filter<B: RoutingDatabase>(
    path: web::Path<(i64, usize)>,
    body: web::Json<FilterUpdate>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (id, index) = path.into_inner();
    let FilterUpdate { expected_version, filter } = body.into_inner();
    debug!("🔗️ PUT filter {index} of link #{id} at version {expected_version}");
    let link = api.replace_filter(id, expected_version, index, filter).await?;
    Ok(HttpResponse::Ok().json(link))
}

route!(remove_filter => Delete "/links/{id}/filters/{index}" impl RoutingDatabase);
pub async fn remove_filter<B: RoutingDatabase>(
    path: web::Path<(i64, usize)>,
    query: web::Query<VersionParam>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (id, index) = path.into_inner();
    debug!("🔗️ DELETE filter {index} of link #{id} at version {}", query.version);
    let link = api.remove_filter(id, query.version, index).await?;
    Ok(HttpResponse::Ok().json(link))
}

//----------------------------------------------   Matches  ----------------------------------------------------
route!(matches => Get "/matches" impl RoutingDatabase);
pub async fn matches<B: RoutingDatabase>(api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET matches");
    Ok(HttpResponse::Ok().json(api.matches().await?))
}

route!(create_match => Post "/matches" impl RoutingDatabase);
pub async fn create_match<B: RoutingDatabase>(
    body: web::Json<NewMatch>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("🧩️ POST new match of {} products to {}", body.input.len(), body.output.len());
    let new_match = api.create_match(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(new_match))
}

route!(delete_match => Delete "/matches/{id}" impl RoutingDatabase);
pub async fn delete_match<B: RoutingDatabase>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("🧩️ DELETE match #{id}");
    api.delete_match(id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Match #{id} deleted"))))
}

route!(sync_inventory => Post "/inventory/sync" impl RoutingDatabase, AdapterFactory);
/// Syncs a batch of matches. Matches that fail are listed in the report; the request itself still succeeds.
pub async fn sync_inventory<B, F>(
    body: web::Json<InventorySyncParams>,
    api: web::Data<InventorySyncApi<B, F>>,
) -> HttpResponse
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    debug!("📦️ POST inventory sync for matches {:?}", body.match_ids);
    let report = api.sync_matches(&body.match_ids, None).await;
    HttpResponse::Ok().json(report)
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(orders => Get "/orders" impl RoutingDatabase);
pub async fn orders<B: RoutingDatabase>(api: web::Data<StoreApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders");
    Ok(HttpResponse::Ok().json(api.orders().await?))
}

route!(order_by_id => Get "/orders/{id}" impl RoutingDatabase);
pub async fn order_by_id<B: RoutingDatabase>(
    path: web::Path<i64>,
    api: web::Data<StoreApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order #{id}");
    Ok(HttpResponse::Ok().json(api.order(id).await?))
}

route!(place_purchase => Post "/orders/{id}/purchase/{channel_id}" impl RoutingDatabase, AdapterFactory);
pub async fn place_purchase<B, F>(
    path: web::Path<(i64, i64)>,
    api: web::Data<OrderFlowApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (order_id, channel_id) = path.into_inner();
    debug!("🛒️ POST purchase of order #{order_id} on channel #{channel_id}");
    let record = api.place_purchase(order_id, channel_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(search_products => Post "/{kind}/{id}/products/search" impl RoutingDatabase, AdapterFactory);
pub async fn search_products<B, F>(
    path: web::Path<(String, i64)>,
    body: web::Json<SearchParams>,
    api: web::Data<CatalogApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (kind, id) = path.into_inner();
    let target = platform_ref(&kind, id)?;
    let SearchParams { search_entry, after } = body.into_inner();
    debug!("🛍️ POST product search '{search_entry}' on {target}");
    let page = api.search_products(target, &search_entry, after).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(product => Get "/{kind}/{id}/products/{product_id}/{variant_id}" impl RoutingDatabase, AdapterFactory);
pub async fn product<B, F>(
    path: web::Path<(String, i64, String, String)>,
    api: web::Data<CatalogApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (kind, id, product_id, variant_id) = path.into_inner();
    let target = platform_ref(&kind, id)?;
    debug!("🛍️ GET product {product_id}/{variant_id} on {target}");
    let product = api.get_product(target, &product_id, &variant_id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(search_orders => Post "/shops/{id}/orders/search" impl RoutingDatabase, AdapterFactory);
pub async fn search_orders<B, F>(
    path: web::Path<i64>,
    body: web::Json<SearchParams>,
    api: web::Data<CatalogApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let shop_id = path.into_inner();
    let SearchParams { search_entry, after } = body.into_inner();
    debug!("🛍️ POST order search '{search_entry}' on shop #{shop_id}");
    let page = api.search_orders(shop_id, &search_entry, after).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(update_product => Post "/shops/{id}/products/update" impl RoutingDatabase, AdapterFactory);
/// `inventory` is a relative adjustment and `price` an absolute replacement. Either may be omitted.
pub async fn update_product<B, F>(
    path: web::Path<i64>,
    body: web::Json<UpdateProductRequest>,
    api: web::Data<CatalogApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let shop_id = path.into_inner();
    debug!("🛍️ POST update product {}/{} on shop #{shop_id}", body.product_id, body.variant_id);
    let result = api.update_product(shop_id, &body).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(webhooks => Get "/{kind}/{id}/webhooks" impl RoutingDatabase, AdapterFactory);
pub async fn webhooks<B, F>(
    path: web::Path<(String, i64)>,
    api: web::Data<WebhookApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (kind, id) = path.into_inner();
    let target = platform_ref(&kind, id)?;
    debug!("🪝️ GET webhooks of {target}");
    Ok(HttpResponse::Ok().json(api.webhooks(target).await?))
}

route!(create_webhook => Post "/{kind}/{id}/webhooks" impl RoutingDatabase, AdapterFactory);
/// Subscribes `endpoint` to each of `events`. Topics the platform rejects are reported alongside the ones it accepts.
pub async fn create_webhook<B, F>(
    path: web::Path<(String, i64)>,
    body: web::Json<NewWebhook>,
    api: web::Data<WebhookApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (kind, id) = path.into_inner();
    let target = platform_ref(&kind, id)?;
    let NewWebhook { endpoint, events } = body.into_inner();
    debug!("🪝️ POST webhook {endpoint} for {} events on {target}", events.len());
    let created = api.create_webhook(target, &endpoint, &events).await?;
    Ok(HttpResponse::Ok().json(created))
}

route!(delete_webhook => Delete "/{kind}/{id}/webhooks/{webhook_id}" impl RoutingDatabase, AdapterFactory);
pub async fn delete_webhook<B, F>(
    path: web::Path<(String, i64, String)>,
    api: web::Data<WebhookApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (kind, id, webhook_id) = path.into_inner();
    let target = platform_ref(&kind, id)?;
    debug!("🪝️ DELETE webhook {webhook_id} of {target}");
    if api.delete_webhook(target, &webhook_id).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Webhook {webhook_id} deleted"))))
    } else {
        Err(ServerError::NoRecordFound(format!("Webhook {webhook_id} of {target}")))
    }
}

route!(sync_webhooks => Post "/{kind}/{id}/webhooks/recommended" impl RoutingDatabase, AdapterFactory);
/// Creates the recommended webhooks `kind/id` is missing.
pub async fn sync_webhooks<B, F>(
    path: web::Path<(String, i64)>,
    api: web::Data<WebhookApi<B, F>>,
) -> Result<HttpResponse, ServerError>
where
    B: RoutingDatabase,
    F: AdapterFactory,
{
    let (kind, id) = path.into_inner();
    let target = platform_ref(&kind, id)?;
    debug!("🪝️ POST recommended webhooks for {target}");
    Ok(HttpResponse::Ok().json(api.sync_recommended(target).await?))
}
