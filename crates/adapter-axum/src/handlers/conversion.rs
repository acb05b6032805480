//! Handlers for conversions that are returned to the caller, not forwarded.

use adapter_core::{BatchConversion, ConversionResult, TextInputResult};
use axum::Json;
use axum::extract::State;
use axum::response::Response;

use super::audio_response;
use crate::error::HttpError;
use crate::form::FormData;
use crate::state::AppState;

/// Default recognition language for uploads.
pub(crate) const DEFAULT_TRANSCRIPTION_LANGUAGE: &str = "en-US";
/// Default speech language.
pub(crate) const DEFAULT_VOICE_LANGUAGE: &str = "en";

/// `POST /text-input/`
pub async fn text_input(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<TextInputResult>, HttpError> {
    let text = form.require_text("text")?;
    let result = state.conversion.receive_text(
        text,
        form.text_or("source", "ui"),
        form.optional("timestamp"),
    )?;
    Ok(Json(result))
}

/// `POST /voice-to-text/`
pub async fn voice_to_text(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ConversionResult>, HttpError> {
    let upload = form.require_file("file")?;
    let language = form.text_or("language", DEFAULT_TRANSCRIPTION_LANGUAGE);
    let result = state.conversion.transcribe(upload, language).await?;
    Ok(Json(ConversionResult::Transcription(result)))
}

/// `POST /voice-to-text/batch/`
pub async fn voice_to_text_batch(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<BatchConversion>, HttpError> {
    let uploads = form.require_files("files")?;
    let language = form.text_or("language", DEFAULT_TRANSCRIPTION_LANGUAGE);
    Ok(Json(state.conversion.transcribe_batch(&uploads, language).await?))
}

/// `POST /text-to-voice/` - the generated audio itself.
pub async fn text_to_voice(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, HttpError> {
    let text = form.require_text("text")?;
    let language = form.text_or("language", DEFAULT_VOICE_LANGUAGE);
    let slow = form.bool_or("slow", false)?;

    let result = state.conversion.synthesize(text, language, slow).await?;
    let audio = result
        .audio_ref
        .as_ref()
        .ok_or_else(|| HttpError::Internal("Failed to generate audio file".into()))?;
    let filename = result.filename.as_deref().unwrap_or("speech.mp3");

    audio_response(
        audio,
        state.conversion.synthesis_media_type(),
        filename,
        &[
            ("x-tts-engine", result.tts_engine.clone()),
            ("x-language", result.language.clone()),
            ("x-slow", result.slow.to_string()),
            ("x-text-length", result.text_length.to_string()),
        ],
    )
    .await
}

/// `POST /text-to-voice/info/`
pub async fn text_to_voice_info(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ConversionResult>, HttpError> {
    let text = form.require_text("text")?;
    let language = form.text_or("language", DEFAULT_VOICE_LANGUAGE);
    let slow = form.bool_or("slow", false)?;

    let result = state.conversion.synthesize_info(text, language, slow).await?;
    Ok(Json(ConversionResult::SpeechSynthesis(result)))
}

/// `POST /text-to-voice/batch/`
pub async fn text_to_voice_batch(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<BatchConversion>, HttpError> {
    let texts = form.require_texts("texts")?;
    let language = form.text_or("language", DEFAULT_VOICE_LANGUAGE);
    let slow = form.bool_or("slow", false)?;
    Ok(Json(
        state.conversion.synthesize_batch(&texts, language, slow).await?,
    ))
}
