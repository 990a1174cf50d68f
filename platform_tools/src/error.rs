use thiserror::Error;

use crate::data_objects::{MutationResult, WebhookEvent};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid adapter configuration: {0}")]
    Configuration(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Invalid GraphQL query: {0}")]
    InvalidGraphQL(String),
    #[error("The platform returned no data for the request")]
    EmptyResponse,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("The platform rejected the request: {0}")]
    Upstream(String),
    #[error("{event} has no webhook topic on {platform}")]
    UnsupportedTopic { platform: String, event: WebhookEvent },
    #[error("Signature verification failed: {0}")]
    InvalidSignature(String),
    #[error("Purchase aborted: {reason}. Draft: {draft_id}. Compensated: {compensated}")]
    PurchaseAborted { draft_id: String, compensated: bool, reason: String },
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("{0} is not supported by this platform")]
    Unsupported(String),
    /// Some sub-mutations of a product update were applied upstream and others were not.
    #[error("Product update only partly applied. {}", summarize(.results))]
    PartialUpdate { results: Vec<MutationResult> },
}

fn summarize(results: &[MutationResult]) -> String {
    results
        .iter()
        .map(|r| match (&r.message, r.success) {
            (_, true) => format!("{}: applied", r.mutation),
            (Some(message), false) => format!("{}: failed ({message})", r.mutation),
            (None, false) => format!("{}: failed", r.mutation),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl AdapterError {
    /// Collapses a list of vendor field errors into a single [`AdapterError::Upstream`].
    pub fn upstream<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = messages.into_iter().map(|s| s.as_ref().to_string()).collect::<Vec<_>>().join(", ");
        Self::Upstream(joined)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::QueryError { status: 404, .. })
    }
}

impl From<osp_common::PriceParseError> for AdapterError {
    fn from(e: osp_common::PriceParseError) -> Self {
        Self::InvalidPrice(e.to_string())
    }
}
