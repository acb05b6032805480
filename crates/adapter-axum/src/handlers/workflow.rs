//! `POST /voice-to-voice/`: transcribe, forward, extract the reply and speak it.

use adapter_core::{VoiceOptions, WorkflowRequest};
use axum::extract::State;
use axum::response::Response;

use super::audio_response;
use super::conversion::{DEFAULT_TRANSCRIPTION_LANGUAGE, DEFAULT_VOICE_LANGUAGE};
use crate::error::HttpError;
use crate::form::FormData;
use crate::state::AppState;

pub async fn voice_to_voice(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Response, HttpError> {
    let request = WorkflowRequest {
        upload: form.require_file("file")?.clone(),
        session: form.session(),
        transcription_language: form
            .text_or("language", DEFAULT_TRANSCRIPTION_LANGUAGE)
            .to_string(),
        voice: VoiceOptions {
            language: form
                .text_or("voice_language", DEFAULT_VOICE_LANGUAGE)
                .to_string(),
            slow: form.bool_or("slow", false)?,
        },
    };

    let reply = state.workflow.run(&state.target(None), request).await?;

    let session = &reply.session;
    audio_response(
        &reply.audio,
        &reply.media_type,
        &reply.filename,
        &[
            ("x-original-text", reply.original_text.clone()),
            ("x-response-text", reply.response_text.clone()),
            ("x-session-id", session.session_id.clone().unwrap_or_default()),
            ("x-user-id", session.user_id.clone().unwrap_or_default()),
            ("x-channel", session.channel.clone().unwrap_or_default()),
            ("x-workflow", "voice-to-voice-complete".to_string()),
        ],
    )
    .await
}
