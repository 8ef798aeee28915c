use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;

use super::body::{build_headers, encode_body, EncodedBody, RequestBody};
use super::error::ApiError;
use crate::config::{resolve_credential, ApiConfig, CredentialStatus, SecureString};
use crate::storage::KeyValueStore;

/// Per-call options for `post` and `patch`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Milliseconds before the request is aborted; `None` uses the client default.
    pub timeout_ms: Option<u64>,
    /// `None` detects form data from the body.
    pub is_form_data: Option<bool>,
}

impl RequestOptions {
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = Some(ms);
        self
    }

    pub fn form_data(mut self, is_form_data: bool) -> Self {
        self.is_form_data = Some(is_form_data);
        self
    }
}

/// Single choke point for backend calls.
///
/// Cheap to clone; clones share the connection pool and the token storage.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    default_timeout: Duration,
    storage: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let http = Client::builder().build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_timeout: Duration::from_millis(config.timeout_ms),
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, RequestBody::Empty, RequestOptions::default())
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.request(Method::POST, path, body.into(), options).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        self.request(Method::PATCH, path, body.into(), options).await
    }

    pub async fn delete(&self, path: &str, body: impl Into<RequestBody>) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, body.into(), RequestOptions::default())
            .await
    }

    /// `get` followed by decoding into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.get(path).await?)
    }

    /// `post` followed by decoding into `T`.
    pub async fn post_as<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        decode(self.post(path, body, options).await?)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let url = self.url_for(path);
        let encoded = encode_body(body, options.is_form_data)?;
        let is_form = encoded.is_multipart();
        let headers = build_headers(is_form, self.bearer_token().as_ref())?;

        let mut builder = self.http.request(method.clone(), &url).headers(headers);
        builder = match encoded {
            EncodedBody::None => builder,
            EncodedBody::Json(bytes) => builder.body(bytes),
            EncodedBody::Multipart(form) => builder.multipart(form.into_multipart()?),
        };

        tracing::debug!(method = %method, url = %url, form_data = is_form, "Sending request");

        let limit = options
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout);

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = match timeout(limit, exchange).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(err)) if err.is_timeout() => {
                tracing::warn!(method = %method, url = %url, "Request timed out in transport");
                return Err(ApiError::Timeout {
                    duration_ms: limit.as_millis() as u64,
                });
            }
            Ok(Err(err)) => {
                tracing::error!(method = %method, url = %url, error = %err, "Network error");
                return Err(ApiError::Network(err));
            }
            Err(_) => {
                tracing::warn!(
                    method = %method,
                    url = %url,
                    timeout_ms = limit.as_millis() as u64,
                    "Request aborted after timeout"
                );
                return Err(ApiError::Timeout {
                    duration_ms: limit.as_millis() as u64,
                });
            }
        };

        handle_response(status, &text)
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn bearer_token(&self) -> Option<SecureString> {
        match resolve_credential(self.storage.as_ref()) {
            Ok(CredentialStatus::Configured(token)) => Some(token),
            Ok(CredentialStatus::Anonymous) => None,
            Err(err) => {
                tracing::warn!(error = %err, "Could not read auth token, sending unauthenticated");
                None
            }
        }
    }
}

/// Turn a status and raw body into the decoded JSON or a `Server` error.
///
/// The body is always parsed from text so that HTML or plain-text error
/// pages surface as messages instead of parse failures.
pub fn handle_response(status: StatusCode, text: &str) -> Result<Value, ApiError> {
    let data: Value = match serde_json::from_str(text) {
        Ok(data) => data,
        Err(_) => {
            tracing::error!(status = status.as_u16(), raw = %text, "Response is not JSON");
            let message = if text.is_empty() {
                format!("Server error ({}). Check the backend logs.", status.as_u16())
            } else {
                text.to_string()
            };
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }
    };

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body = %data, "API error response");
        let message = match data.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(Value::Null) | None => "The server reported an error".to_string(),
            Some(other) => other.to_string(),
        };
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }

    Ok(data)
}

/// Map a decoded response onto `T`.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(ApiError::Decode)
}

/// Append URL-encoded query parameters to a path.
pub fn path_with_query(path: &str, params: &[(&str, String)]) -> String {
    // The host is a placeholder; only path and query are kept.
    let Ok(mut url) = Url::parse(&format!("http://localhost{}", path)) else {
        return path.to_string();
    };
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    match url.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
        _ => url.path().to_string(),
    }
}
