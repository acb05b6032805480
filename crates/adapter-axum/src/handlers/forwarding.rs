//! Handlers that convert and forward results to the downstream API.
//!
//! Every handler accepts an optional `custom_headers` field
//! (`key:value,key:value`). Malformed header strings are ignored.

use adapter_core::{
    BatchForwardingEnvelope, ForwardingEnvelope, VoiceOptions, parse_custom_headers,
};
use axum::Json;
use axum::extract::State;

use super::conversion::{DEFAULT_TRANSCRIPTION_LANGUAGE, DEFAULT_VOICE_LANGUAGE};
use crate::error::HttpError;
use crate::form::FormData;
use crate::state::AppState;

fn target(state: &AppState, form: &FormData) -> adapter_core::ForwardTarget {
    state.target(parse_custom_headers(form.text("custom_headers")))
}

/// Concurrency limit from the form. Non-positive values map to 0, which the
/// dispatcher rejects.
fn concurrency_limit(state: &AppState, form: &FormData) -> Result<usize, HttpError> {
    let default = i64::try_from(state.settings.default_concurrency).unwrap_or(i64::MAX);
    let limit = form.int_or("concurrent_limit", default)?;
    Ok(usize::try_from(limit).unwrap_or(0))
}

fn voice_options(form: &FormData) -> Result<VoiceOptions, HttpError> {
    Ok(VoiceOptions {
        language: form.text_or("language", DEFAULT_VOICE_LANGUAGE).to_string(),
        slow: form.bool_or("slow", false)?,
    })
}

/// `POST /voice-to-text-forward/`
pub async fn voice_to_text_forward(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ForwardingEnvelope>, HttpError> {
    let upload = form.require_file("file")?;
    let language = form.text_or("language", DEFAULT_TRANSCRIPTION_LANGUAGE);
    let include_metadata = form.bool_or("include_metadata", true)?;

    let envelope = state
        .forwarding
        .forward_voice_to_text(
            &target(&state, &form),
            upload,
            language,
            &form.session(),
            include_metadata,
        )
        .await?;
    Ok(Json(envelope))
}

/// `POST /voice-to-text-batch-forward/`
pub async fn voice_to_text_batch_forward(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<BatchForwardingEnvelope>, HttpError> {
    let uploads = form.require_files("files")?;
    let language = form.text_or("language", DEFAULT_TRANSCRIPTION_LANGUAGE);
    let include_metadata = form.bool_or("include_metadata", true)?;
    let limit = concurrency_limit(&state, &form)?;

    let envelope = state
        .forwarding
        .forward_voice_to_text_batch(
            &target(&state, &form),
            &uploads,
            language,
            include_metadata,
            limit,
        )
        .await?;
    Ok(Json(envelope))
}

/// `POST /forward-transcription/`
pub async fn forward_transcription(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ForwardingEnvelope>, HttpError> {
    let text = form.require_text("transcription_text")?;
    let language = form.text_or("language", DEFAULT_TRANSCRIPTION_LANGUAGE);
    let source = form.text_or("source", "manual");

    let envelope = state
        .forwarding
        .forward_existing_transcription(&target(&state, &form), text, language, source)
        .await?;
    Ok(Json(envelope))
}

/// `POST /text-input-forward/`
pub async fn text_input_forward(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ForwardingEnvelope>, HttpError> {
    let text = form.require_text("text")?;
    let include_metadata = form.bool_or("include_metadata", true)?;

    let envelope = state
        .forwarding
        .forward_text_input(
            &target(&state, &form),
            text,
            form.text_or("source", "ui"),
            form.optional("timestamp"),
            &form.session(),
            include_metadata,
        )
        .await?;
    Ok(Json(envelope))
}

/// `POST /text-to-voice-forward/`
pub async fn text_to_voice_forward(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ForwardingEnvelope>, HttpError> {
    let text = form.require_text("text")?;
    let voice = voice_options(&form)?;
    let include_audio = form.bool_or("include_audio_data", false)?;
    let include_metadata = form.bool_or("include_metadata", true)?;

    let envelope = state
        .forwarding
        .forward_text_to_voice(
            &target(&state, &form),
            text,
            &voice,
            include_audio,
            include_metadata,
        )
        .await?;
    Ok(Json(envelope))
}

/// `POST /text-to-voice-batch-forward/`
pub async fn text_to_voice_batch_forward(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<BatchForwardingEnvelope>, HttpError> {
    let texts = form.require_texts("texts")?;
    let voice = voice_options(&form)?;
    let include_audio = form.bool_or("include_audio_data", false)?;
    let include_metadata = form.bool_or("include_metadata", true)?;
    let limit = concurrency_limit(&state, &form)?;

    let envelope = state
        .forwarding
        .forward_text_to_voice_batch(
            &target(&state, &form),
            &texts,
            &voice,
            include_audio,
            include_metadata,
            limit,
        )
        .await?;
    Ok(Json(envelope))
}
