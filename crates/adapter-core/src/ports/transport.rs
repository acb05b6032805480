//! Outbound transport port used for every downstream dispatch.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{ForwardOutcome, HttpMethod};

/// Caller-supplied headers, merged over the transport's defaults.
pub type CustomHeaders = BTreeMap<String, String>;

/// Sends one JSON payload to a downstream endpoint.
///
/// Implementations must be safe to call concurrently from many in-flight
/// dispatches and must never fail with an error: connection problems,
/// timeouts and HTTP error statuses are all reported through the returned
/// [`ForwardOutcome`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForwardTransport: Send + Sync {
    async fn dispatch(
        &self,
        url: &str,
        payload: &Value,
        headers: &CustomHeaders,
        method: HttpMethod,
    ) -> ForwardOutcome;
}
