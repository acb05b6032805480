//! Runtime settings and validation.
//!
//! Settings are plain data. They are loaded once at startup, from
//! `ADAPTER_*` environment variables by the binary, and handed to the
//! composition root; nothing reads the environment after that.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::domain::HttpMethod;

/// Default port for the adapter's HTTP server.
pub const DEFAULT_PORT: u16 = 8000;

/// Default downstream endpoint that receives forwarded results.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:8003/chat";

/// Prefix of every environment variable read by [`AdapterSettings::from_lookup`].
pub const ENV_PREFIX: &str = "ADAPTER_";

/// Adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdapterSettings {
    /// Interface the HTTP server binds to.
    pub host: String,

    pub port: u16,

    /// Downstream endpoint every forwarding operation dispatches to.
    pub target_url: String,

    /// Per-request timeout applied uniformly to every dispatch.
    pub request_timeout_secs: u64,

    pub forward_method: HttpMethod,

    /// Concurrency limit used when a batch request does not supply one.
    pub default_concurrency: usize,

    /// Maximum number of files accepted by a batch transcription.
    pub max_batch_items: usize,

    /// Maximum accepted request body size.
    pub max_upload_bytes: usize,

    pub user_agent: String,

    /// Base URL of the OpenAI-compatible transcription API.
    pub stt_base_url: String,
    pub stt_api_key: Option<String>,
    pub stt_model: String,

    /// Base URL of the Google Translate text-to-speech endpoint.
    pub tts_base_url: String,

    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AdapterSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            target_url: DEFAULT_TARGET_URL.to_string(),
            request_timeout_secs: 30,
            forward_method: HttpMethod::Post,
            default_concurrency: crate::services::DEFAULT_CONCURRENCY_LIMIT,
            max_batch_items: 10,
            max_upload_bytes: 25 * 1024 * 1024,
            user_agent: format!("{}/{}", crate::SERVICE_NAME, crate::SERVICE_VERSION),
            stt_base_url: "https://api.openai.com/v1".to_string(),
            stt_api_key: None,
            stt_model: "whisper-1".to_string(),
            tts_base_url: "https://translate.google.com".to_string(),
            cors_origins: Vec::new(),
        }
    }

    /// Build settings from a key lookup, falling back to defaults.
    ///
    /// Keys are the upper-cased field names prefixed with `ADAPTER_`, e.g.
    /// `ADAPTER_TARGET_URL`. `ADAPTER_CORS_ORIGINS` is comma-separated.
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        };

        let mut settings = Self::with_defaults();

        if let Some((_, v)) = get("HOST") {
            settings.host = v;
        }
        if let Some(kv) = get("PORT") {
            settings.port = parse_value(kv)?;
        }
        if let Some((_, v)) = get("TARGET_URL") {
            settings.target_url = v;
        }
        if let Some(kv) = get("REQUEST_TIMEOUT_SECS") {
            settings.request_timeout_secs = parse_value(kv)?;
        }
        if let Some(kv) = get("FORWARD_METHOD") {
            settings.forward_method = parse_value(kv)?;
        }
        if let Some(kv) = get("DEFAULT_CONCURRENCY") {
            settings.default_concurrency = parse_value(kv)?;
        }
        if let Some(kv) = get("MAX_BATCH_ITEMS") {
            settings.max_batch_items = parse_value(kv)?;
        }
        if let Some(kv) = get("MAX_UPLOAD_BYTES") {
            settings.max_upload_bytes = parse_value(kv)?;
        }
        if let Some((_, v)) = get("USER_AGENT") {
            settings.user_agent = v;
        }
        if let Some((_, v)) = get("STT_BASE_URL") {
            settings.stt_base_url = v;
        }
        if let Some((_, v)) = get("STT_API_KEY") {
            settings.stt_api_key = Some(v);
        }
        if let Some((_, v)) = get("STT_MODEL") {
            settings.stt_model = v;
        }
        if let Some((_, v)) = get("TTS_BASE_URL") {
            settings.tts_base_url = v;
        }
        if let Some((_, v)) = get("CORS_ORIGINS") {
            settings.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(settings)
    }
}

fn parse_value<T: FromStr>((key, value): (String, String)) -> Result<T, SettingsError> {
    value
        .parse()
        .map_err(|_| SettingsError::InvalidValue { key, value })
}

/// Errors that can occur during settings validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Target URL must be an http(s) URL, got {0:?}")]
    InvalidTargetUrl(String),

    #[error("Request timeout must be at least 1 second")]
    ZeroTimeout,

    #[error("Default concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("Max batch items must be at least 1")]
    ZeroBatchSize,
}

/// Validate settings values.
pub fn validate_settings(settings: &AdapterSettings) -> Result<(), SettingsError> {
    let target = Url::parse(settings.target_url.trim()).ok();
    let is_http = target.is_some_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
    });
    if !is_http {
        return Err(SettingsError::InvalidTargetUrl(settings.target_url.clone()));
    }

    if settings.request_timeout_secs == 0 {
        return Err(SettingsError::ZeroTimeout);
    }

    if settings.default_concurrency == 0 {
        return Err(SettingsError::ZeroConcurrency);
    }

    if settings.max_batch_items == 0 {
        return Err(SettingsError::ZeroBatchSize);
    }

    Ok(())
}
