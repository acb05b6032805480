//! Speech synthesis through the Google Translate TTS endpoint.
//!
//! The endpoint accepts short texts only, so input is split into chunks of
//! at most [`MAX_TTS_CHUNK_CHARS`] characters. Each chunk is fetched as an
//! MP3 and the frames are concatenated into one temp file.

use std::io::Write;
use std::time::Duration;

use adapter_core::{AudioRef, ConversionError, SynthesisPort, SynthesizedAudio};
use async_trait::async_trait;
use tempfile::TempPath;
use tracing::{debug, info};

use super::status_error;
use crate::text_utils::split_into_chunks;

/// Longest text the endpoint accepts in one request.
pub const MAX_TTS_CHUNK_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct GoogleTtsConfig {
    /// Service root, e.g. `https://translate.google.com`.
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

pub struct GoogleTtsEngine {
    client: reqwest::Client,
    config: GoogleTtsConfig,
}

impl GoogleTtsEngine {
    pub fn new(config: GoogleTtsConfig) -> Result<Self, ConversionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConversionError::Failed(format!("Failed to build TTS client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate_tts", self.config.base_url.trim_end_matches('/'))
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        slow: bool,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, ConversionError> {
        let speed = if slow { "0.3" } else { "1" };
        let (total, idx, textlen) = (
            total.to_string(),
            idx.to_string(),
            chunk.chars().count().to_string(),
        );
        let query = [
            ("ie", "UTF-8"),
            ("q", chunk),
            ("tl", language),
            ("ttsspeed", speed),
            ("total", total.as_str()),
            ("idx", idx.as_str()),
            ("textlen", textlen.as_str()),
            ("client", "tw-ob"),
        ];

        let response = self
            .client
            .get(self.endpoint())
            .query(&query)
            .send()
            .await
            .map_err(|e| ConversionError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConversionError::ServiceUnavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Write `audio` to a fresh temp file. The file is removed when the path drops.
fn write_temp_mp3(audio: &[u8]) -> Result<TempPath, ConversionError> {
    let mut file = tempfile::Builder::new()
        .prefix("tts_")
        .suffix(".mp3")
        .tempfile()?;
    file.write_all(audio)?;
    file.flush()?;
    Ok(file.into_temp_path())
}

#[async_trait]
impl SynthesisPort for GoogleTtsEngine {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        slow: bool,
    ) -> Result<SynthesizedAudio, ConversionError> {
        let chunks = split_into_chunks(text, MAX_TTS_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(ConversionError::EmptyInput);
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(idx, total, chars = chunk.chars().count(), "Fetching TTS chunk");
            audio.extend(self.fetch_chunk(chunk, language, slow, idx, total).await?);
        }

        if audio.is_empty() {
            return Err(ConversionError::Failed("Failed to generate audio file".into()));
        }

        let file_size_bytes = audio.len() as u64;
        let path = tokio::task::spawn_blocking(move || write_temp_mp3(&audio))
            .await
            .map_err(|e| ConversionError::Failed(format!("Audio write task failed: {e}")))??;

        info!(chunks = total, bytes = file_size_bytes, language, slow, "Speech synthesized");
        Ok(SynthesizedAudio {
            audio: AudioRef::with_owner(path.to_path_buf(), path),
            file_size_bytes,
        })
    }

    fn engine_name(&self) -> &str {
        "gTTS"
    }
}
