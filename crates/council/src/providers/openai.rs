//! OpenAI Responses API backend.

use super::ModelBackend;
use super::responses::{ResponsesRequest, extract_output_text};
use crate::model::{Message, QueryError, QueryResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/responses";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Bytes of a failed response body kept in [`QueryError::Status`].
const MAX_ERROR_BODY: usize = 1024;

/// Builder for creating an OpenAI backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    api_key: Option<String>,
    api_url: String,
    timeout: Duration,
    client: Option<reqwest::Client>,
}

impl OpenAiBackendBuilder {
    /// Create a new builder. A missing key is accepted here and reported per
    /// query as [`QueryError::CredentialMissing`].
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    /// Set the endpoint that receives the POST.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Set the default per-call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuse an existing HTTP client (and its connection pool).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the backend.
    pub fn build(self) -> OpenAiBackend {
        OpenAiBackend {
            client: self.client.unwrap_or_default(),
            api_key: self.api_key.filter(|key| !key.is_empty()),
            api_url: self.api_url,
            timeout: self.timeout,
        }
    }
}

/// Client for one Responses-compatible endpoint, shared by every model query.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    timeout: Duration,
}

impl OpenAiBackend {
    /// Create a builder for the OpenAI backend.
    pub fn builder(api_key: Option<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(api_key)
    }

    /// Default per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query one model with the default deadline. Failures are logged and
    /// reported as `None`.
    pub async fn query(&self, model: &str, messages: &[Message]) -> Option<QueryResult> {
        self.query_with_timeout(model, messages, self.timeout).await
    }

    /// Like [`query`](Self::query) with an explicit deadline.
    pub async fn query_with_timeout(
        &self,
        model: &str,
        messages: &[Message],
        timeout: Duration,
    ) -> Option<QueryResult> {
        match self.try_query(model, messages, timeout).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(model, error = %e, "error querying model");
                None
            }
        }
    }

    /// Query one model and report the typed failure.
    ///
    /// The deadline covers the whole exchange: connect, send, and reading the
    /// body. Without a credential no request is made.
    pub async fn try_query(
        &self,
        model: &str,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<QueryResult, QueryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(QueryError::CredentialMissing)?;

        let request = ResponsesRequest::new(model, messages);
        debug!(model, url = %self.api_url, messages = messages.len(), "querying model");

        let payload = tokio::time::timeout(timeout, self.post(api_key, &request))
            .await
            .map_err(|_| QueryError::Timeout(timeout))??;

        let content = extract_output_text(&payload).ok_or(QueryError::NoOutputText)?;
        debug!(model, chars = content.len(), "model responded");

        Ok(QueryResult::text(content))
    }

    async fn post(
        &self,
        api_key: &str,
        request: &ResponsesRequest<'_>,
    ) -> Result<Value, QueryError> {
        let response = self
            .client
            .post(&self.api_url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => truncate_body(body),
                Err(e) => format!("<failed to read body: {e}>"),
            };
            return Err(QueryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| QueryError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| QueryError::MalformedPayload(e.to_string()))
    }
}

/// Cut `body` to at most [`MAX_ERROR_BODY`] bytes on a char boundary.
fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = if self.api_key.is_some() { "set" } else { "unset" };
        write!(f, "openai({}, key={auth})", self.api_url)
    }
}

impl ModelBackend for OpenAiBackend {
    async fn call(&self, model: &str, messages: &[Message]) -> Result<QueryResult, QueryError> {
        self.try_query(model, messages, self.timeout).await
    }
}
