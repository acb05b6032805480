//! Conversion results produced by the speech engines and text intake.

use serde::{Deserialize, Serialize};

use super::audio::AudioRef;

/// Which conversion produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    Transcription,
    TextInput,
    SpeechSynthesis,
}

impl ConversionKind {
    /// Key under which a single result is reported in a forwarding envelope.
    pub const fn operation_name(self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::TextInput => "text_input",
            Self::SpeechSynthesis => "text_to_voice",
        }
    }

    /// `type` tag carried by an individual result.
    pub const fn result_type(self) -> &'static str {
        match self {
            Self::Transcription => "voice_to_text",
            Self::TextInput => "text_input",
            Self::SpeechSynthesis => "text_to_voice",
        }
    }
}

/// Session correlation fields supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Option<String>,
    pub user_id: Option<String>,
    pub channel: Option<String>,
}

impl SessionInfo {
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.user_id.is_none() && self.channel.is_none()
    }
}

/// Outcome of transcribing one audio input (or of wrapping manual text).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_info: Option<SessionInfo>,
}

impl TranscriptionResult {
    pub fn succeeded(
        filename: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            filename: Some(filename.into()),
            text: Some(text.into()),
            language: language.into(),
            format: Some(format.into()),
            source: None,
            error: None,
            session_info: None,
        }
    }

    pub fn failed(
        filename: Option<String>,
        language: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            filename,
            text: None,
            language: language.into(),
            format: None,
            source: None,
            error: Some(error.into()),
            session_info: None,
        }
    }

    /// Text that did not come from the speech engine (typed or pasted).
    pub fn manual(
        text: impl Into<String>,
        language: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            filename: None,
            text: Some(text.into()),
            language: language.into(),
            format: None,
            source: Some(source.into()),
            error: None,
            session_info: None,
        }
    }

    pub fn text_length(&self) -> usize {
        self.text.as_deref().map_or(0, |t| t.chars().count())
    }
}

/// Acknowledgement of raw text received from a UI or other producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInputResult {
    pub success: bool,
    pub message: String,
    pub text_length: usize,
    pub source: String,
    pub received_at: Option<String>,
    pub processed_text: String,
}

impl TextInputResult {
    pub fn received(text: &str, source: impl Into<String>, received_at: Option<String>) -> Self {
        Self {
            success: true,
            message: "Text received successfully".to_string(),
            text_length: text.chars().count(),
            source: source.into(),
            received_at,
            processed_text: text.trim().to_string(),
        }
    }
}

/// Outcome of synthesizing speech for one text.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub text_length: usize,
    pub language: String,
    pub slow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_bytes: Option<u64>,
    pub tts_engine: String,
    pub output_format: String,
    #[serde(rename = "file_path", skip_serializing_if = "Option::is_none")]
    pub audio_ref: Option<AudioRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A conversion result of any kind.
///
/// Serialized with a `type` tag (`voice_to_text`, `text_input`,
/// `text_to_voice`) alongside the variant's own fields.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ConversionResult {
    #[serde(rename = "voice_to_text")]
    Transcription(TranscriptionResult),
    #[serde(rename = "text_input")]
    TextInput(TextInputResult),
    #[serde(rename = "text_to_voice")]
    SpeechSynthesis(SynthesisResult),
}

impl ConversionResult {
    pub const fn kind(&self) -> ConversionKind {
        match self {
            Self::Transcription(_) => ConversionKind::Transcription,
            Self::TextInput(_) => ConversionKind::TextInput,
            Self::SpeechSynthesis(_) => ConversionKind::SpeechSynthesis,
        }
    }

    /// Failed results are never forwarded downstream.
    pub const fn success(&self) -> bool {
        match self {
            Self::Transcription(r) => r.success,
            Self::TextInput(r) => r.success,
            Self::SpeechSynthesis(r) => r.success,
        }
    }

    pub fn source_language(&self) -> Option<&str> {
        match self {
            Self::Transcription(r) => Some(&r.language),
            Self::TextInput(_) => None,
            Self::SpeechSynthesis(r) => Some(&r.language),
        }
    }

    pub const fn audio_ref(&self) -> Option<&AudioRef> {
        match self {
            Self::SpeechSynthesis(r) => r.audio_ref.as_ref(),
            _ => None,
        }
    }

    pub fn text_length(&self) -> usize {
        match self {
            Self::Transcription(r) => r.text_length(),
            Self::TextInput(r) => r.text_length,
            Self::SpeechSynthesis(r) => r.text_length,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Transcription(r) => r.error.as_deref(),
            Self::TextInput(_) => None,
            Self::SpeechSynthesis(r) => r.error.as_deref(),
        }
    }
}
