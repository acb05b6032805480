//! Transcription through an OpenAI-compatible speech-to-text API.

use std::time::Duration;

use adapter_core::{ConversionError, Transcript, TranscriptionPort};
use async_trait::async_trait;
use reqwest::multipart;
use tracing::{debug, info};

use super::status_error;

/// Connection settings for [`OpenAiSttEngine`].
#[derive(Debug, Clone)]
pub struct OpenAiSttConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

pub struct OpenAiSttEngine {
    client: reqwest::Client,
    config: OpenAiSttConfig,
}

impl OpenAiSttEngine {
    pub fn new(config: OpenAiSttConfig) -> Result<Self, ConversionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConversionError::Failed(format!("Failed to build STT client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Primary subtag of a BCP 47 tag: `en-US` becomes `en`.
pub fn primary_language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// MIME type for a supported upload extension.
pub fn mime_for_format(format: &str) -> &'static str {
    match format {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "aac" => "audio/aac",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl TranscriptionPort for OpenAiSttEngine {
    async fn transcribe(
        &self,
        audio: &[u8],
        format: &str,
        language: &str,
    ) -> Result<Transcript, ConversionError> {
        let file_part = multipart::Part::bytes(audio.to_vec())
            .file_name(format!("audio.{format}"))
            .mime_str(mime_for_format(format))
            .map_err(|e| ConversionError::Failed(format!("mime: {e}")))?;

        let form = multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("language", primary_language(language).to_string())
            .text("response_format", "text")
            .part("file", file_part);

        debug!(model = %self.config.model, format, language, "Sending audio to transcription API");

        let mut request = self.client.post(self.endpoint()).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ConversionError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ConversionError::ServiceUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let text = body.trim();
        if text.is_empty() {
            return Err(ConversionError::Unintelligible);
        }

        info!(chars = text.chars().count(), "Transcription API completed");
        Ok(Transcript {
            text: text.to_string(),
            language: language.to_string(),
        })
    }

    fn engine_name(&self) -> &str {
        &self.config.model
    }
}
