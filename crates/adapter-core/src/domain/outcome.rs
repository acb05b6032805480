//! Dispatch outcomes and their aggregate summary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// HTTP methods accepted for forwarding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Post,
    Put,
    Patch,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            other => Err(format!("unsupported forward method: {other}")),
        }
    }
}

/// Parse a downstream response body, wrapping non-JSON text as `{"raw_response": ...}`.
pub fn parse_response_body(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| json!({ "raw_response": raw }))
}

/// Result of one dispatch attempt.
///
/// Every attempt produces one of these, whether the downstream answered with
/// a success, answered with an error status, or could not be reached at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardOutcome {
    pub success: bool,
    /// `None` when no HTTP response was received.
    pub status_code: Option<u16>,
    /// Parsed downstream body; may be a `raw_response` wrapper. Not guaranteed to be an object.
    pub response_data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub index: usize,
    pub url: String,
    pub method: HttpMethod,
}

impl ForwardOutcome {
    /// Classify a received HTTP response. Statuses below 400 count as success.
    pub fn completed(url: &str, method: HttpMethod, status: u16, raw_body: &str) -> Self {
        let success = status < 400;
        Self {
            success,
            status_code: Some(status),
            response_data: parse_response_body(raw_body),
            error: (!success).then(|| format!("HTTP {status}: {raw_body}")),
            index: 0,
            url: url.to_string(),
            method,
        }
    }

    /// An attempt that never produced an HTTP response.
    pub fn failed(url: &str, method: HttpMethod, error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: None,
            response_data: Value::Null,
            error: Some(error.into()),
            index: 0,
            url: url.to_string(),
            method,
        }
    }

    #[must_use]
    pub const fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// Aggregate counts over a list of outcomes. `successful + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[ForwardOutcome]) -> Self {
        Self::tally(outcomes.iter().map(|o| o.success))
    }

    /// Count any sequence of success flags.
    pub fn tally(flags: impl IntoIterator<Item = bool>) -> Self {
        let (total, successful) = flags
            .into_iter()
            .fold((0, 0), |(t, s), ok| (t + 1, s + usize::from(ok)));
        Self {
            total,
            successful,
            failed: total - successful,
        }
    }
}
