//! Service info and health endpoints.

use adapter_core::{SERVICE_NAME, SERVICE_VERSION};
use axum::Json;
use serde_json::{Value, json};

const FEATURES: &[&str] = &[
    "voice-to-text conversion",
    "text-to-voice synthesis",
    "text input processing",
    "batch processing",
    "multiple audio formats",
    "configurable voice parameters",
    "REST API forwarding",
    "external service integration",
    "text input forwarding",
    "text-to-voice forwarding",
    "audio data forwarding",
    "session tracking support",
    "voice-to-voice workflow",
];

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "channel adapter",
        "version": SERVICE_VERSION,
        "status": "running",
        "features": FEATURES,
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}
