//! Builders for the payloads sent to the downstream API.
//!
//! Each builder is a pure function of its inputs. Speech payloads take the
//! audio bytes already loaded by the caller. The `timestamp` field is left
//! `null` unless supplied.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::{
    ConversionKind, SessionInfo, SynthesisResult, TextInputResult, TranscriptionResult,
};
use crate::{SERVICE_NAME, SERVICE_VERSION};

/// Serializes a result with its `type` tag without cloning it into a [`ConversionResult`](crate::ConversionResult).
#[derive(Serialize)]
struct Tagged<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    inner: &'a T,
}

fn tagged<T>(kind: ConversionKind, inner: &T) -> Tagged<'_, T> {
    Tagged {
        kind: kind.result_type(),
        inner,
    }
}

fn with_session(mut payload: Map<String, Value>, session: &SessionInfo) -> Map<String, Value> {
    payload.insert("session_id".into(), json!(session.session_id));
    payload.insert("user_id".into(), json!(session.user_id));
    payload.insert("channel".into(), json!(session.channel));
    payload
}

/// Payload for a transcription: the result under `text` plus session fields.
pub fn build_transcription_payload(
    result: &TranscriptionResult,
    session: &SessionInfo,
    engine: &str,
    include_metadata: bool,
) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "text".into(),
        json!(tagged(ConversionKind::Transcription, result)),
    );
    let mut payload = with_session(payload, session);

    if include_metadata {
        payload.insert(
            "metadata".into(),
            json!({
                "service": SERVICE_NAME,
                "version": SERVICE_VERSION,
                "conversion_engine": engine,
                "audio_format": result.format.as_deref().unwrap_or("unknown"),
                "language": result.language,
            }),
        );
    }
    Value::Object(payload)
}

/// Payload for raw text input: the text itself plus session fields.
pub fn build_text_input_payload(
    text: &str,
    result: &TextInputResult,
    session: &SessionInfo,
    include_metadata: bool,
) -> Value {
    let mut payload = Map::new();
    payload.insert("text".into(), json!(text));
    let mut payload = with_session(payload, session);

    if include_metadata {
        payload.insert(
            "metadata".into(),
            json!({
                "service": SERVICE_NAME,
                "version": SERVICE_VERSION,
                "processing_type": "text-input",
                "original_source": result.source,
                "text_length": result.text_length,
            }),
        );
    }
    Value::Object(payload)
}

/// Options for [`build_speech_synthesis_payload`].
#[derive(Debug, Clone, Default)]
pub struct SynthesisPayloadOptions {
    pub language: String,
    pub slow: bool,
    pub include_metadata: bool,
    /// Position in the originating batch; `None` for single conversions.
    pub batch_index: Option<usize>,
    pub timestamp: Option<String>,
}

/// Payload for a synthesis result. `audio` is embedded as base64 when given.
pub fn build_speech_synthesis_payload(
    result: &SynthesisResult,
    audio: Option<&[u8]>,
    options: &SynthesisPayloadOptions,
) -> Value {
    let mut payload = Map::new();
    payload.insert(
        "text_to_voice".into(),
        json!(tagged(ConversionKind::SpeechSynthesis, result)),
    );
    payload.insert("source".into(), json!(SERVICE_NAME));
    payload.insert("timestamp".into(), json!(options.timestamp));

    if let Some(bytes) = audio {
        payload.insert(
            "audio_data".into(),
            json!({
                "data": STANDARD.encode(bytes),
                "format": result.output_format,
                "encoding": "base64",
            }),
        );
    }

    if options.include_metadata {
        let metadata = match options.batch_index {
            None => json!({
                "service": SERVICE_NAME,
                "version": SERVICE_VERSION,
                "processing_type": "text-to-voice",
                "tts_engine": result.tts_engine,
                "language": result.language,
                "output_format": result.output_format,
                "text_length": result.text_length,
                "file_size_bytes": result.file_size_bytes.unwrap_or(0),
            }),
            Some(batch_index) => json!({
                "service": SERVICE_NAME,
                "version": SERVICE_VERSION,
                "processing_type": "text-to-voice-batch",
                "tts_engine": result.tts_engine,
                "language": options.language,
                "slow": options.slow,
                "batch_index": batch_index,
            }),
        };
        payload.insert("metadata".into(), metadata);
    }
    Value::Object(payload)
}
