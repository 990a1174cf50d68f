use std::sync::Arc;

use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, App};
use anyhow::anyhow;
use log::debug;
use openship_engine::{events::EventProducers, AdapterFactory, MemoryDatabase};
use platform_tools::AdapterConfig;

use crate::server::{api_data, api_routes};

/// Sends `req` to a fresh app serving the `/api` routes over `db` and `adapters`, and returns the status and body.
pub async fn send<F>(db: &MemoryDatabase, adapters: F, req: TestRequest) -> anyhow::Result<(StatusCode, String)>
where F: AdapterFactory + 'static {
    send_with_config(db, adapters, AdapterConfig::default(), req).await
}

pub async fn send_with_config<F>(
    db: &MemoryDatabase,
    adapters: F,
    config: AdapterConfig,
    req: TestRequest,
) -> anyhow::Result<(StatusCode, String)>
where
    F: AdapterFactory + 'static,
{
    let config = Arc::new(config);
    let app = App::new().service(
        web::scope("/api")
            .configure(api_data(db.clone(), adapters, EventProducers::default(), config))
            .configure(api_routes::<MemoryDatabase, F>),
    );
    let service = test::init_service(app).await;
    let req = req.to_request();
    debug!("Making request to {}", req.uri());
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| anyhow!("{e}"))?.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().map_err(|_| anyhow!("Response body was not buffered"))?;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}
