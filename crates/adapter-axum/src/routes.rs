//! Route definitions and router construction.
//!
//! Paths keep their trailing slashes; clients of the service post to
//! `/voice-to-text/`, not `/voice-to-text`.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::AxumContext;
use crate::handlers;
use crate::state::AppState;

/// Response headers browsers may read on cross-origin requests.
const EXPOSED_HEADERS: &[&str] = &[
    "content-disposition",
    "x-original-text",
    "x-response-text",
    "x-session-id",
    "x-user-id",
    "x-channel",
    "x-workflow",
    "x-tts-engine",
    "x-language",
    "x-slow",
    "x-text-length",
];

/// Build CORS layer. An empty origin list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let exposed: Vec<HeaderName> = EXPOSED_HEADERS
        .iter()
        .copied()
        .map(HeaderName::from_static)
        .collect();
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(exposed);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(allowed)
    }
}

pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        // Plain conversions
        .route("/text-input/", post(handlers::conversion::text_input))
        .route("/voice-to-text/", post(handlers::conversion::voice_to_text))
        .route(
            "/voice-to-text/batch/",
            post(handlers::conversion::voice_to_text_batch),
        )
        .route("/text-to-voice/", post(handlers::conversion::text_to_voice))
        .route(
            "/text-to-voice/info/",
            post(handlers::conversion::text_to_voice_info),
        )
        .route(
            "/text-to-voice/batch/",
            post(handlers::conversion::text_to_voice_batch),
        )
        // Forwarding
        .route(
            "/voice-to-text-forward/",
            post(handlers::forwarding::voice_to_text_forward),
        )
        .route(
            "/voice-to-text-batch-forward/",
            post(handlers::forwarding::voice_to_text_batch_forward),
        )
        .route(
            "/forward-transcription/",
            post(handlers::forwarding::forward_transcription),
        )
        .route(
            "/text-input-forward/",
            post(handlers::forwarding::text_input_forward),
        )
        .route(
            "/text-to-voice-forward/",
            post(handlers::forwarding::text_to_voice_forward),
        )
        .route(
            "/text-to-voice-batch-forward/",
            post(handlers::forwarding::text_to_voice_batch_forward),
        )
        // Chained workflow
        .route("/voice-to-voice/", post(handlers::workflow::voice_to_voice))
}

/// Create the main Axum router with all routes.
pub fn create_router(ctx: AxumContext) -> Router {
    let cors = build_cors_layer(&ctx.settings.cors_origins);
    let body_limit = ctx.settings.max_upload_bytes;
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/", get(handlers::info::root))
        .route("/health", get(handlers::info::health))
        .merge(api_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
