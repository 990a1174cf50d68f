use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use openship_engine::{
    CatalogError,
    OAuthError,
    OrderFlowError,
    RoutingError,
    StoreError,
    WebhookSyncError,
};
use platform_tools::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Signature verification failed. {0}")]
    InvalidSignature(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The request conflicts with the current state. {0}")]
    Conflict(String),
    #[error("The request cannot be processed. {0}")]
    Unprocessable(String),
    #[error("The platform could not complete the request. {0}")]
    UpstreamError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NoRecordFound(e.to_string()),
            StoreError::VersionConflict { .. } => Self::Conflict(e.to_string()),
            StoreError::InvalidFilter(_) => Self::InvalidRequestBody(e.to_string()),
            StoreError::Backend(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<AdapterError> for ServerError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::InvalidSignature(_) => Self::InvalidSignature(e.to_string()),
            AdapterError::NotFound(_) => Self::NoRecordFound(e.to_string()),
            AdapterError::UnsupportedTopic { .. } | AdapterError::Unsupported(_) => Self::Unprocessable(e.to_string()),
            AdapterError::InvalidPrice(_) => Self::InvalidRequestBody(e.to_string()),
            AdapterError::Initialization(_) | AdapterError::Configuration(_) => Self::BackendError(e.to_string()),
            AdapterError::RestRequestError(_) |
            AdapterError::RestResponseError(_) |
            AdapterError::JsonError(_) |
            AdapterError::QueryError { .. } |
            AdapterError::InvalidGraphQL(_) |
            AdapterError::EmptyResponse |
            AdapterError::Upstream(_) |
            AdapterError::PartialUpdate { .. } |
            AdapterError::PurchaseAborted { .. } => Self::UpstreamError(e.to_string()),
        }
    }
}

impl From<RoutingError> for ServerError {
    fn from(e: RoutingError) -> Self {
        match e {
            RoutingError::Store(e) => e.into(),
            RoutingError::InvalidFilter { .. } => Self::Unprocessable(e.to_string()),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::Store(e) => e.into(),
            OrderFlowError::Adapter(e) => e.into(),
            OrderFlowError::Routing(e) => e.into(),
            OrderFlowError::NothingToPurchase { .. } => Self::Conflict(e.to_string()),
            OrderFlowError::PurchaseNotRecorded { .. } => Self::BackendError(e.to_string()),
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::Store(e) => e.into(),
            CatalogError::Adapter(e) => e.into(),
        }
    }
}

impl From<WebhookSyncError> for ServerError {
    fn from(e: WebhookSyncError) -> Self {
        match e {
            WebhookSyncError::Store(e) => e.into(),
            WebhookSyncError::Adapter(e) => e.into(),
        }
    }
}

impl From<OAuthError> for ServerError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::Store(e) => e.into(),
            OAuthError::Adapter(e) => e.into(),
            OAuthError::MissingDomain => Self::InvalidRequestBody(e.to_string()),
        }
    }
}
