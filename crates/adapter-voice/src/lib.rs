//! Speech engines for the channel adapter.
//!
//! Implements the conversion ports from `adapter-core`:
//!
//! - [`OpenAiSttEngine`]: transcription through an OpenAI-compatible
//!   `/audio/transcriptions` endpoint
//! - [`GoogleTtsEngine`]: speech through the Google Translate TTS endpoint,
//!   written to a temp MP3 that lives as long as its [`adapter_core::AudioRef`]
//!
//! [`SpeechEngines::from_settings`] builds both from [`AdapterSettings`].

pub mod backend;
pub mod text_utils;

use std::sync::Arc;
use std::time::Duration;

use adapter_core::{AdapterSettings, ConversionError, SynthesisPort, TranscriptionPort};

pub use backend::google_tts::{GoogleTtsConfig, GoogleTtsEngine};
pub use backend::openai_stt::{OpenAiSttConfig, OpenAiSttEngine};

/// The pair of engines injected into the conversion service.
#[derive(Clone)]
pub struct SpeechEngines {
    pub transcriber: Arc<dyn TranscriptionPort>,
    pub synthesizer: Arc<dyn SynthesisPort>,
}

impl SpeechEngines {
    pub fn from_settings(settings: &AdapterSettings) -> Result<Self, ConversionError> {
        let timeout = Duration::from_secs(settings.request_timeout_secs);

        let transcriber = OpenAiSttEngine::new(OpenAiSttConfig {
            base_url: settings.stt_base_url.clone(),
            api_key: settings.stt_api_key.clone(),
            model: settings.stt_model.clone(),
            timeout,
        })?;
        let synthesizer = GoogleTtsEngine::new(GoogleTtsConfig {
            base_url: settings.tts_base_url.clone(),
            user_agent: settings.user_agent.clone(),
            timeout,
        })?;

        Ok(Self {
            transcriber: Arc::new(transcriber),
            synthesizer: Arc::new(synthesizer),
        })
    }
}
