use std::{sync::Arc, time::Duration};

use graphql_parser::parse_query;
use log::*;
use osp_common::Secret;
use reqwest::{header::HeaderMap, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{AdapterConfig, AdapterError};

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Thin reqwest wrapper shared by all adapters. Every request carries the configured timeout and the platform's
/// authentication headers. Idempotent `GET`s are retried on 429, 5xx and transport errors.
#[derive(Clone)]
pub struct RestClient {
    client: Arc<Client>,
    base_url: String,
    basic_auth: Option<(String, Secret<String>)>,
    max_retries: u32,
}

impl RestClient {
    pub fn new(base_url: String, headers: HeaderMap, config: &AdapterConfig) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AdapterError::Initialization(e.to_string()))?;
        Ok(Self { client: Arc::new(client), base_url, basic_auth: None, max_retries: config.max_retries })
    }

    pub fn with_basic_auth(mut self, username: String, password: Secret<String>) -> Self {
        self.basic_auth = Some((username, password));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends a REST request and deserializes the response. An empty success body deserializes as JSON `null`.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, AdapterError> {
        let url = self.url(path);
        let retries = if method == Method::GET { self.max_retries } else { 0 };
        let mut attempt = 0;
        loop {
            trace!("Sending REST query: {method} {url}");
            let mut req = self.client.request(method.clone(), &url);
            if !params.is_empty() {
                req = req.query(params);
            }
            if let Some(body) = &body {
                req = req.json(body);
            }
            if let Some((user, pass)) = &self.basic_auth {
                req = req.basic_auth(user, Some(pass.reveal()));
            }
            let response = match req.send().await {
                Ok(r) => r,
                Err(e) if attempt < retries => {
                    warn!("🌐️ {method} {url} failed ({e}). Retrying.");
                    attempt += 1;
                    backoff(attempt).await;
                    continue;
                },
                Err(e) => return Err(AdapterError::RestResponseError(e.to_string())),
            };
            let status = response.status();
            if is_retryable(status) && attempt < retries {
                warn!("🌐️ {method} {url} returned {status}. Retrying.");
                attempt += 1;
                backoff(attempt).await;
                continue;
            }
            let text = response.text().await.map_err(|e| AdapterError::RestResponseError(e.to_string()))?;
            if status.is_success() {
                trace!("REST query successful. {status}");
                let text = if text.trim().is_empty() { "null" } else { text.as_str() };
                return serde_json::from_str::<T>(text).map_err(|e| AdapterError::JsonError(e.to_string()));
            }
            debug!("🌐️ {method} {url} failed with {status}: {text}");
            if status == StatusCode::NOT_FOUND {
                return Err(AdapterError::NotFound(format!("{path}. {text}")));
            }
            return Err(AdapterError::QueryError { status: status.as_u16(), message: text });
        }
    }

    /// Validates and posts a GraphQL document to `path`. Top-level `errors` are collapsed into
    /// [`AdapterError::Upstream`] and a `null` data object is an [`AdapterError::EmptyResponse`].
    pub async fn graphql_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
        variables: Option<Value>,
    ) -> Result<T, AdapterError> {
        let query = parse_query::<String>(query).map_err(|e| AdapterError::InvalidGraphQL(e.to_string()))?;
        let mut body = serde_json::json!({
            "query": query.to_string(),
        });
        if let Some(vars) = variables {
            body["variables"] = vars;
        }
        trace!("Sending GraphQL query: {body}");
        let result = self.rest_query::<Value, Value>(Method::POST, path, &[], Some(body)).await?;
        if let Some(errors) = result["errors"].as_array() {
            let messages =
                errors.iter().map(|e| e["message"].as_str().map(String::from).unwrap_or_else(|| e.to_string()));
            return Err(AdapterError::upstream(messages));
        }
        let data = result["data"].clone();
        trace!("GraphQL response: {data}");
        trace!("GraphQL costs: {}", result["extensions"]["cost"]);
        if data.is_null() {
            return Err(AdapterError::EmptyResponse);
        }
        serde_json::from_value(data).map_err(|e| AdapterError::JsonError(e.to_string()))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

async fn backoff(attempt: u32) {
    let delay = RETRY_BASE_DELAY * 2u32.saturating_pow(attempt.saturating_sub(1));
    tokio::time::sleep(delay).await;
}

/// Collects GraphQL `userErrors` into an [`AdapterError::Upstream`], if there are any.
pub fn check_user_errors(errors: &Value) -> Result<(), AdapterError> {
    match errors.as_array() {
        Some(errors) if !errors.is_empty() => {
            let messages = errors.iter().map(|e| {
                let field = e["field"].as_array().map(|f| {
                    f.iter().filter_map(|s| s.as_str()).collect::<Vec<_>>().join(".")
                });
                let message = e["message"].as_str().unwrap_or("unknown error");
                match field {
                    Some(f) if !f.is_empty() => format!("{f}: {message}"),
                    _ => message.to_string(),
                }
            });
            Err(AdapterError::upstream(messages))
        },
        _ => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use reqwest::header::HeaderMap;
    use serde_json::json;

    use super::*;

    fn client(url: String, retries: u32) -> RestClient {
        let config = AdapterConfig { max_retries: retries, ..Default::default() };
        RestClient::new(url, HeaderMap::new(), &config).unwrap()
    }

    #[tokio::test]
    async fn get_requests_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let failing = server.mock("GET", "/thing").with_status(503).expect(2).create_async().await;
        let client = client(server.url(), 1);
        let err = client.rest_query::<Value, ()>(Method::GET, "/thing", &[], None).await.unwrap_err();
        assert!(matches!(err, AdapterError::QueryError { status: 503, .. }));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn mutations_are_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let failing = server.mock("POST", "/thing").with_status(500).expect(1).create_async().await;
        let client = client(server.url(), 3);
        let err = client.rest_query::<Value, Value>(Method::POST, "/thing", &[], Some(json!({}))).await.unwrap_err();
        assert!(matches!(err, AdapterError::QueryError { status: 500, .. }));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_and_empty_bodies() {
        let mut server = mockito::Server::new_async().await;
        let _m1 = server.mock("GET", "/missing").with_status(404).create_async().await;
        let _m2 = server.mock("DELETE", "/gone").with_status(204).create_async().await;
        let client = client(server.url(), 0);
        let err = client.rest_query::<Value, ()>(Method::GET, "/missing", &[], None).await.unwrap_err();
        assert!(err.is_not_found());
        let v = client.rest_query::<Value, ()>(Method::DELETE, "/gone", &[], None).await.unwrap();
        assert!(v.is_null());
    }

    #[tokio::test]
    async fn graphql_errors_are_collected() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({"errors": [{"message": "Field 'x' doesn't exist"}, {"message": "Throttled"}]});
        let _m = server.mock("POST", "/graphql.json").with_body(body.to_string()).create_async().await;
        let client = client(server.url(), 0);
        let err = client.graphql_query::<Value>("/graphql.json", "{ shop { name } }", None).await.unwrap_err();
        assert_eq!(err.to_string(), "The platform rejected the request: Field 'x' doesn't exist, Throttled");
        let err = client.graphql_query::<Value>("/graphql.json", "{ shop { name ", None).await.unwrap_err();
        assert!(matches!(err, AdapterError::InvalidGraphQL(_)));
    }

    #[test]
    fn user_errors() {
        assert!(check_user_errors(&json!([])).is_ok());
        assert!(check_user_errors(&Value::Null).is_ok());
        let err = check_user_errors(&json!([{"field": ["input", "email"], "message": "is invalid"}])).unwrap_err();
        assert_eq!(err.to_string(), "The platform rejected the request: input.email: is invalid");
    }
}
