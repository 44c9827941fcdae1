//! HTTP client for the SuperExpat backend
//!
//! [`ChatClient`] is the async client. [`ChatBackend`] is the blocking seam the
//! chat session talks to; [`HttpChatBackend`] implements it by driving a
//! [`ChatClient`] on a private current-thread runtime.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::types::{BackendMetrics, ChatRequest, ChatResponse, ServiceStatus};

/// Anything that can answer one chat message.
///
/// Implementations must resolve every call (success or error); callers never
/// retry.
pub trait ChatBackend: Send + Sync {
    fn send(&self, message: &str) -> Result<ChatResponse>;
}

/// Async HTTP client for the backend API
#[derive(Debug, Clone)]
pub struct ChatClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ChatClient {
    /// Create a new client from configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/chat for the first page of results.
    pub async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(%url, chars = message.chars().count(), "Sending chat request");

        let response = self
            .http_client
            .post(&url)
            .json(&ChatRequest::first_page(message))
            .send()
            .await
            .map_err(transport_error)?;

        parse_json(response).await
    }

    /// GET /api/status
    pub async fn status(&self) -> Result<ServiceStatus> {
        self.get_json("/api/status").await
    }

    /// GET /api/metrics
    pub async fn metrics(&self) -> Result<BackendMetrics> {
        self.get_json("/api/metrics").await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }
}

async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), url = %response.url(), "Backend returned error status");
        // hyper only records the phrase when it differs from the canonical one
        let reason = response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        return Err(Error::with_reason(status, reason.as_deref()));
    }

    let body = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&body)
        .map_err(|e| Error::Transport(format!("failed to parse response: {}", e)))
}

/// Flatten a reqwest error and its causes into one line.
///
/// reqwest's own message ("error sending request for url ...") hides the
/// part users can act on (connection refused, dns failure).
fn transport_error(err: reqwest::Error) -> Error {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    Error::Transport(message)
}

/// Blocking [`ChatBackend`] over HTTP
pub struct HttpChatBackend {
    client: ChatClient,
    runtime: tokio::runtime::Runtime,
}

impl HttpChatBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = ChatClient::new(config)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to create runtime: {}", e)))?;
        Ok(Self { client, runtime })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// GET /api/status (blocking)
    pub fn status(&self) -> Result<ServiceStatus> {
        self.runtime.block_on(self.client.status())
    }

    /// GET /api/metrics (blocking)
    pub fn metrics(&self) -> Result<BackendMetrics> {
        self.runtime.block_on(self.client.metrics())
    }
}

impl ChatBackend for HttpChatBackend {
    fn send(&self, message: &str) -> Result<ChatResponse> {
        self.runtime.block_on(self.client.chat(message))
    }
}
