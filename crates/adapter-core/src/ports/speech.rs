//! Speech engine ports.
//!
//! The engines are black boxes: one turns audio bytes into text, the other
//! turns text into an audio file.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::AudioRef;

// ── Errors ───────────────────────────────────────────────────────────

/// Errors reported by a speech engine or by input validation in front of it.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The uploaded file has no name or an extension that is not accepted.
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// No audio bytes or no text to work with.
    #[error("Input is empty")]
    EmptyInput,

    /// The engine produced no usable transcript.
    #[error("Could not understand the audio. Please ensure the audio is clear and contains speech.")]
    Unintelligible,

    /// The engine could not be reached.
    #[error("Speech service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The engine answered but the conversion failed.
    #[error("{0}")]
    Failed(String),

    /// Reading or writing local audio failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    /// HTTP-equivalent status for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::UnsupportedFormat(_) | Self::EmptyInput | Self::Unintelligible => 400,
            Self::ServiceUnavailable(_) => 503,
            Self::Failed(_) | Self::Io(_) => 500,
        }
    }
}

// ── Speech-to-text ───────────────────────────────────────────────────

/// Text recognised from one audio input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub language: String,
}

#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Transcribe `audio` encoded as `format` (an extension such as `wav`).
    async fn transcribe(
        &self,
        audio: &[u8],
        format: &str,
        language: &str,
    ) -> Result<Transcript, ConversionError>;

    /// Name reported in payload metadata.
    fn engine_name(&self) -> &str;
}

// ── Text-to-speech ───────────────────────────────────────────────────

/// Audio produced by a synthesis engine.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub audio: AudioRef,
    pub file_size_bytes: u64,
}

#[async_trait]
pub trait SynthesisPort: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        slow: bool,
    ) -> Result<SynthesizedAudio, ConversionError>;

    fn engine_name(&self) -> &str;

    /// File format of the produced audio.
    fn output_format(&self) -> &str {
        "mp3"
    }

    fn media_type(&self) -> &str {
        "audio/mpeg"
    }
}
