use actix_web::HttpRequest;
use bytes::Bytes;
use log::trace;
use openship_engine::PlatformRef;
use platform_tools::{data_objects::WebhookRequest, PlatformKind};

use crate::errors::ServerError;

/// Copies the raw body and the headers of an inbound webhook delivery into the form the adapters verify and parse.
///
/// The body must stay byte-for-byte what the platform signed. Headers that are not valid UTF-8 are dropped.
pub fn webhook_request(req: &HttpRequest, body: Bytes) -> WebhookRequest {
    req.headers().iter().fold(WebhookRequest::new(body.to_vec()), |request, (name, value)| match value.to_str() {
        Ok(v) => request.with_header(name.as_str(), v),
        Err(_) => {
            trace!("💻️ Ignoring non-text header {name}");
            request
        },
    })
}

/// Resolves the `shops` / `channels` path segment of the admin routes that serve both roles.
pub fn platform_ref(kind: &str, id: i64) -> Result<PlatformRef, ServerError> {
    match kind {
        "shops" => Ok(PlatformRef::Shop(id)),
        "channels" => Ok(PlatformRef::Channel(id)),
        _ => Err(ServerError::InvalidRequestPath(format!("Expected 'shops' or 'channels', not '{kind}'"))),
    }
}

pub fn platform_kind(platform: &str) -> Result<PlatformKind, ServerError> {
    platform.parse::<PlatformKind>().map_err(ServerError::InvalidRequestPath)
}
