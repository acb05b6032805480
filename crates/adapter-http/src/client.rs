//! Pooled JSON transport to the downstream API.

use std::time::Duration;

use adapter_core::{AdapterSettings, CustomHeaders, ForwardOutcome, ForwardTransport, HttpMethod};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Idle connections kept per downstream host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Settings for the outbound transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Applied uniformly to every dispatch.
    pub timeout: Duration,
    pub user_agent: String,
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::from_settings(&AdapterSettings::with_defaults())
    }
}

impl TransportConfig {
    pub fn from_settings(settings: &AdapterSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.request_timeout_secs),
            user_agent: settings.user_agent.clone(),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
        }
    }
}

/// Shared HTTP transport for every downstream dispatch.
///
/// The underlying client is created on first use and reused afterwards;
/// `reqwest::Client` is internally synchronised, so concurrent dispatches
/// share one pool without further locking. [`close`](Self::close) drops
/// the pool. A dispatch after `close` builds a fresh one.
pub struct TransportClient {
    config: TransportConfig,
    client: RwLock<Option<Client>>,
}

impl TransportClient {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
        }
    }

    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn client(&self) -> Result<Client, reqwest::Error> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .timeout(self.config.timeout)
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host)
            .build()?;
        debug!(timeout_secs = self.config.timeout.as_secs(), "Created HTTP client pool");
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Whether a connection pool currently exists.
    pub async fn is_open(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Drop the connection pool. Returns `false` if there was nothing to close.
    pub async fn close(&self) -> bool {
        let closed = self.client.write().await.take().is_some();
        if closed {
            info!("HTTP client pool closed");
        }
        closed
    }

    /// Defaults first, then caller headers, so caller values win.
    fn build_headers(&self, custom: &CustomHeaders) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match HeaderValue::from_str(&self.config.user_agent) {
            Ok(value) => {
                headers.insert(USER_AGENT, value);
            }
            Err(_) => warn!(user_agent = %self.config.user_agent, "Invalid user agent, omitting"),
        }

        for (key, value) in custom {
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = %key, "Skipping invalid custom header"),
            }
        }
        headers
    }

    fn classify_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("Request timed out after {}s", self.config.timeout.as_secs())
        } else if err.is_connect() {
            format!("Connection failed: {err}")
        } else {
            format!("Client error: {err}")
        }
    }
}

const fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

#[async_trait]
impl ForwardTransport for TransportClient {
    async fn dispatch(
        &self,
        url: &str,
        payload: &Value,
        headers: &CustomHeaders,
        method: HttpMethod,
    ) -> ForwardOutcome {
        let client = match self.client().await {
            Ok(client) => client,
            Err(e) => {
                error!(error = %e, "Failed to build HTTP client");
                return ForwardOutcome::failed(url, method, self.classify_error(&e));
            }
        };

        info!(url, method = %method, "Sending payload");
        debug!(payload = %payload, "Payload");

        let response = match client
            .request(reqwest_method(method), url)
            .headers(self.build_headers(headers))
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = self.classify_error(&e);
                error!(url, error = %message, "Dispatch failed");
                return ForwardOutcome::failed(url, method, message);
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let message = self.classify_error(&e);
                error!(url, status, error = %message, "Failed to read response body");
                return ForwardOutcome::failed(url, method, message);
            }
        };

        if status >= 400 {
            error!(url, status, body = %body, "Downstream API returned an error");
        } else {
            info!(url, status, "Payload delivered");
        }
        ForwardOutcome::completed(url, method, status, &body)
    }
}
