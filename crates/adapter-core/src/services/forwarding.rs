//! Forwarding service - conversion, payload assembly and dispatch.
//!
//! Single-shot operations convert, build one payload and dispatch it.
//! Batch operations convert every item, keep the successful ones, and hand
//! their payloads to the [`BatchDispatcher`].

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::{
    AudioUpload, BatchConversion, BatchForwardingEnvelope, ConversionResult, ForwardOutcome,
    ForwardingEnvelope, HttpMethod, SessionInfo, SynthesisResult, TranscriptionResult,
};
use crate::error::AdapterError;
use crate::payload::{
    SynthesisPayloadOptions, build_speech_synthesis_payload, build_text_input_payload,
    build_transcription_payload,
};
use crate::ports::{CustomHeaders, ForwardTransport};

use super::batch_dispatcher::{BatchDispatcher, validate_concurrency_limit};
use super::conversion::ConversionService;

/// Where and how results are forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardTarget {
    pub url: String,
    pub method: HttpMethod,
    /// Extra headers for this request, merged over the transport defaults.
    pub headers: CustomHeaders,
}

impl ForwardTarget {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: CustomHeaders::new(),
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: Option<CustomHeaders>) -> Self {
        self.headers = headers.unwrap_or_default();
        self
    }
}

/// Language and pace used for speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOptions {
    pub language: String,
    pub slow: bool,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            slow: false,
        }
    }
}

/// Service for every forwarding operation.
pub struct ForwardingService {
    conversion: Arc<ConversionService>,
    transport: Arc<dyn ForwardTransport>,
    dispatcher: BatchDispatcher,
}

impl ForwardingService {
    pub fn new(conversion: Arc<ConversionService>, transport: Arc<dyn ForwardTransport>) -> Self {
        let dispatcher = BatchDispatcher::new(Arc::clone(&transport));
        Self {
            conversion,
            transport,
            dispatcher,
        }
    }

    async fn dispatch_one(
        &self,
        target: &ForwardTarget,
        payload: &serde_json::Value,
    ) -> ForwardOutcome {
        debug!(url = %target.url, method = %target.method, "Forwarding payload");
        let outcome = self
            .transport
            .dispatch(&target.url, payload, &target.headers, target.method)
            .await;
        if outcome.success {
            info!(url = %target.url, status = ?outcome.status_code, "Forward succeeded");
        } else {
            error!(url = %target.url, error = ?outcome.error, "Forward failed");
        }
        outcome
    }

    /// Transcribe one file and forward the transcription.
    pub async fn forward_voice_to_text(
        &self,
        target: &ForwardTarget,
        upload: &AudioUpload,
        language: &str,
        session: &SessionInfo,
        include_metadata: bool,
    ) -> Result<ForwardingEnvelope, AdapterError> {
        let result = self.conversion.transcribe(upload, language).await?;
        let payload = build_transcription_payload(
            &result,
            session,
            self.conversion.transcription_engine(),
            include_metadata,
        );
        let outcome = self.dispatch_one(target, &payload).await;
        Ok(ForwardingEnvelope::new(
            ConversionResult::Transcription(result),
            outcome,
        ))
    }

    /// Transcribe several files and forward each successful transcription.
    pub async fn forward_voice_to_text_batch(
        &self,
        target: &ForwardTarget,
        uploads: &[AudioUpload],
        language: &str,
        include_metadata: bool,
        concurrency_limit: usize,
    ) -> Result<BatchForwardingEnvelope, AdapterError> {
        validate_concurrency_limit(concurrency_limit)?;
        let batch = self.conversion.transcribe_batch(uploads, language).await?;

        let engine = self.conversion.transcription_engine();
        let session = SessionInfo::default();
        let payloads = batch
            .successful()
            .filter_map(|result| match result {
                ConversionResult::Transcription(r) => {
                    Some(build_transcription_payload(r, &session, engine, include_metadata))
                }
                _ => None,
            })
            .collect();

        self.dispatch_batch(target, batch, payloads, concurrency_limit)
            .await
    }

    /// Forward text that was transcribed elsewhere, as if it were a transcription.
    pub async fn forward_existing_transcription(
        &self,
        target: &ForwardTarget,
        text: &str,
        language: &str,
        source: &str,
    ) -> Result<ForwardingEnvelope, AdapterError> {
        if text.trim().is_empty() {
            return Err(AdapterError::Validation(
                "Transcription text must not be empty".into(),
            ));
        }
        let result = TranscriptionResult::manual(text, language, source);
        let payload = build_transcription_payload(
            &result,
            &SessionInfo::default(),
            self.conversion.transcription_engine(),
            true,
        );
        let outcome = self.dispatch_one(target, &payload).await;
        Ok(ForwardingEnvelope::new(
            ConversionResult::Transcription(result),
            outcome,
        ))
    }

    /// Acknowledge raw text input and forward it.
    pub async fn forward_text_input(
        &self,
        target: &ForwardTarget,
        text: &str,
        source: &str,
        timestamp: Option<String>,
        session: &SessionInfo,
        include_metadata: bool,
    ) -> Result<ForwardingEnvelope, AdapterError> {
        let result = self.conversion.receive_text(text, source, timestamp)?;
        let payload = build_text_input_payload(text, &result, session, include_metadata);
        let outcome = self.dispatch_one(target, &payload).await;
        Ok(ForwardingEnvelope::new(
            ConversionResult::TextInput(result),
            outcome,
        ))
    }

    /// Synthesize speech and forward the result, optionally with the audio embedded.
    pub async fn forward_text_to_voice(
        &self,
        target: &ForwardTarget,
        text: &str,
        voice: &VoiceOptions,
        include_audio: bool,
        include_metadata: bool,
    ) -> Result<ForwardingEnvelope, AdapterError> {
        let mut result = self
            .conversion
            .synthesize(text, &voice.language, voice.slow)
            .await?;
        if !include_audio {
            result.audio_ref = None;
            result.filename = None;
        }

        let audio = load_audio(&result, include_audio).await;
        let payload = build_speech_synthesis_payload(
            &result,
            audio.as_deref(),
            &SynthesisPayloadOptions {
                language: voice.language.clone(),
                slow: voice.slow,
                include_metadata,
                batch_index: None,
                timestamp: None,
            },
        );
        let outcome = self.dispatch_one(target, &payload).await;
        Ok(ForwardingEnvelope::new(
            ConversionResult::SpeechSynthesis(result),
            outcome,
        ))
    }

    /// Synthesize several texts and forward each successful result.
    pub async fn forward_text_to_voice_batch(
        &self,
        target: &ForwardTarget,
        texts: &[String],
        voice: &VoiceOptions,
        include_audio: bool,
        include_metadata: bool,
        concurrency_limit: usize,
    ) -> Result<BatchForwardingEnvelope, AdapterError> {
        validate_concurrency_limit(concurrency_limit)?;
        let batch = self
            .conversion
            .synthesize_batch(texts, &voice.language, voice.slow)
            .await?;

        let mut payloads = Vec::new();
        for result in batch.successful() {
            let ConversionResult::SpeechSynthesis(r) = result else {
                continue;
            };
            let audio = load_audio(r, include_audio).await;
            payloads.push(build_speech_synthesis_payload(
                r,
                audio.as_deref(),
                &SynthesisPayloadOptions {
                    language: voice.language.clone(),
                    slow: voice.slow,
                    include_metadata,
                    batch_index: Some(r.index.unwrap_or(0)),
                    timestamp: None,
                },
            ));
        }

        self.dispatch_batch(target, batch, payloads, concurrency_limit)
            .await
    }

    async fn dispatch_batch(
        &self,
        target: &ForwardTarget,
        batch: BatchConversion,
        payloads: Vec<serde_json::Value>,
        concurrency_limit: usize,
    ) -> Result<BatchForwardingEnvelope, AdapterError> {
        let forward_results = if payloads.is_empty() {
            info!(kind = batch.kind.operation_name(), "No successful conversions to forward");
            Vec::new()
        } else {
            self.dispatcher
                .dispatch_batch(
                    &target.url,
                    payloads,
                    &target.headers,
                    target.method,
                    concurrency_limit,
                )
                .await?
        };
        Ok(BatchForwardingEnvelope::new(batch, forward_results))
    }
}

/// Read the generated audio for embedding. An unreadable file is logged and
/// left out so the payload can still be sent.
async fn load_audio(result: &SynthesisResult, include_audio: bool) -> Option<Vec<u8>> {
    if !include_audio {
        return None;
    }
    let audio = result.audio_ref.as_ref()?;
    match audio.load().await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(path = %audio.path().display(), error = %e, "Failed to include audio data");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioRef;
    use crate::ports::{
        ConversionError, MockForwardTransport, SynthesisPort, SynthesizedAudio, Transcript,
        TranscriptionPort,
    };
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::io::Write;

    const URL: &str = "http://downstream.test/chat";

    struct EchoTranscriber;

    #[async_trait]
    impl TranscriptionPort for EchoTranscriber {
        async fn transcribe(
            &self,
            audio: &[u8],
            _format: &str,
            language: &str,
        ) -> Result<Transcript, ConversionError> {
            if audio.is_empty() || audio == b"noise" {
                return Err(ConversionError::Unintelligible);
            }
            Ok(Transcript {
                text: String::from_utf8_lossy(audio).into_owned(),
                language: language.to_string(),
            })
        }

        fn engine_name(&self) -> &str {
            "echo-stt"
        }
    }

    /// Writes the text itself as the "audio" so payloads can be checked.
    struct FileSynthesizer;

    #[async_trait]
    impl SynthesisPort for FileSynthesizer {
        async fn synthesize(
            &self,
            text: &str,
            _language: &str,
            _slow: bool,
        ) -> Result<SynthesizedAudio, ConversionError> {
            if text == "fail" {
                return Err(ConversionError::Failed("engine refused".into()));
            }
            let mut file = tempfile::NamedTempFile::new()?;
            file.write_all(text.as_bytes())?;
            let path = file.into_temp_path();
            Ok(SynthesizedAudio {
                audio: AudioRef::with_owner(path.to_path_buf(), path),
                file_size_bytes: text.len() as u64,
            })
        }

        fn engine_name(&self) -> &str {
            "file-tts"
        }
    }

    fn service(transport: MockForwardTransport) -> ForwardingService {
        let conversion = Arc::new(ConversionService::new(
            Arc::new(EchoTranscriber),
            Arc::new(FileSynthesizer),
            10,
        ));
        ForwardingService::new(conversion, Arc::new(transport))
    }

    fn echo_transport() -> MockForwardTransport {
        let mut transport = MockForwardTransport::new();
        transport
            .expect_dispatch()
            .returning(|url, payload, _, method| {
                ForwardOutcome::completed(url, method, 200, &json!({"got": payload}).to_string())
            });
        transport
    }

    fn target() -> ForwardTarget {
        ForwardTarget::new(URL, HttpMethod::Post)
    }

    #[tokio::test]
    async fn test_forward_voice_to_text_includes_session() {
        let service = service(echo_transport());
        let session = SessionInfo {
            session_id: Some("abc".into()),
            ..SessionInfo::default()
        };

        let envelope = service
            .forward_voice_to_text(
                &target(),
                &AudioUpload::new("hi.wav", b"hello".to_vec()),
                "en-US",
                &session,
                true,
            )
            .await
            .unwrap();

        assert!(envelope.success());
        let sent = &envelope.forward_result.response_data["got"];
        assert_eq!(sent["text"]["text"], json!("hello"));
        assert_eq!(sent["session_id"], json!("abc"));
        assert_eq!(sent["metadata"]["conversion_engine"], json!("echo-stt"));
    }

    #[tokio::test]
    async fn test_single_envelope_mirrors_failed_outcome() {
        let mut transport = MockForwardTransport::new();
        transport
            .expect_dispatch()
            .times(1)
            .returning(|url, _, _, method| ForwardOutcome::completed(url, method, 502, "bad gateway"));
        let service = service(transport);

        let envelope = service
            .forward_text_input(&target(), "hello", "ui", None, &SessionInfo::default(), true)
            .await
            .unwrap();

        assert!(!envelope.success());
        assert_eq!(
            envelope.forward_result.error.as_deref(),
            Some("HTTP 502: bad gateway")
        );
    }

    #[tokio::test]
    async fn test_custom_headers_and_method_are_passed_through() {
        let mut headers = CustomHeaders::new();
        headers.insert("X-Api-Key".into(), "secret".into());

        let mut transport = MockForwardTransport::new();
        transport
            .expect_dispatch()
            .withf(|url, _, headers, method| {
                url == URL
                    && headers.get("X-Api-Key").map(String::as_str) == Some("secret")
                    && *method == HttpMethod::Put
            })
            .times(1)
            .returning(|url, _, _, method| ForwardOutcome::completed(url, method, 200, "{}"));
        let service = service(transport);

        let target = ForwardTarget::new(URL, HttpMethod::Put).with_headers(Some(headers));
        let envelope = service
            .forward_existing_transcription(&target, "typed text", "en-US", "manual")
            .await
            .unwrap();

        assert!(envelope.success());
        let ConversionResult::Transcription(result) = &envelope.result else {
            panic!("expected transcription");
        };
        assert_eq!(result.source.as_deref(), Some("manual"));
    }

    #[tokio::test]
    async fn test_conversion_failure_skips_dispatch() {
        let mut transport = MockForwardTransport::new();
        transport.expect_dispatch().never();
        let service = service(transport);

        let err = service
            .forward_voice_to_text(
                &target(),
                &AudioUpload::new("bad.wav", b"noise".to_vec()),
                "en-US",
                &SessionInfo::default(),
                true,
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_batch_forwards_only_successful_items() {
        let mut transport = MockForwardTransport::new();
        transport
            .expect_dispatch()
            .withf(|url, _, _, method| url == URL && *method == HttpMethod::Post)
            .times(2)
            .returning(|url, _, _, method| ForwardOutcome::completed(url, method, 200, "{}"));
        let service = service(transport);

        let uploads = vec![
            AudioUpload::new("a.wav", b"one".to_vec()),
            AudioUpload::new("b.wav", b"noise".to_vec()),
            AudioUpload::new("c.wav", b"three".to_vec()),
        ];
        let envelope = service
            .forward_voice_to_text_batch(&target(), &uploads, "en-US", true, 2)
            .await
            .unwrap();

        assert_eq!(envelope.total_items(), 3);
        assert_eq!(envelope.forward_results.len(), 2);
        assert_eq!(envelope.successful_forwards(), 2);
        assert!(envelope.success());
        let indexes: Vec<usize> = envelope.forward_results.iter().map(|o| o.index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_batch_with_no_successes_is_not_dispatched() {
        let mut transport = MockForwardTransport::new();
        transport.expect_dispatch().never();
        let service = service(transport);

        let envelope = service
            .forward_voice_to_text_batch(
                &target(),
                &[AudioUpload::new("a.wav", b"noise".to_vec())],
                "en-US",
                true,
                3,
            )
            .await
            .unwrap();

        assert!(!envelope.success());
        assert_eq!(envelope.total_items(), 1);
        assert_eq!(envelope.successful_forwards(), 0);
    }

    #[tokio::test]
    async fn test_batch_rejects_zero_concurrency_before_conversion() {
        let mut transport = MockForwardTransport::new();
        transport.expect_dispatch().never();
        let service = service(transport);

        let result = service
            .forward_text_to_voice_batch(
                &target(),
                &["hi".to_string()],
                &VoiceOptions::default(),
                false,
                true,
                0,
            )
            .await;
        assert!(matches!(result, Err(AdapterError::Validation(_))));
    }

    #[tokio::test]
    async fn test_text_to_voice_embeds_audio_when_requested() {
        let service = service(echo_transport());

        let envelope = service
            .forward_text_to_voice(&target(), "ID3", &VoiceOptions::default(), true, true)
            .await
            .unwrap();

        let sent = &envelope.forward_result.response_data["got"];
        assert_eq!(sent["audio_data"]["data"], json!("SUQz"));
        assert_eq!(sent["metadata"]["processing_type"], json!("text-to-voice"));
        assert_eq!(sent["metadata"]["tts_engine"], json!("file-tts"));
    }

    #[tokio::test]
    async fn test_unreadable_audio_is_left_out() {
        let result = SynthesisResult {
            success: true,
            index: None,
            message: None,
            text: None,
            text_length: 5,
            language: "en".into(),
            slow: false,
            file_size_bytes: Some(3),
            tts_engine: "file-tts".into(),
            output_format: "mp3".into(),
            audio_ref: Some(AudioRef::new("/nonexistent/dir/speech.mp3")),
            filename: None,
            error: None,
        };

        assert_eq!(load_audio(&result, true).await, None);
        assert_eq!(load_audio(&result, false).await, None);
    }

    #[tokio::test]
    async fn test_text_to_voice_without_audio_drops_reference() {
        let service = service(echo_transport());

        let envelope = service
            .forward_text_to_voice(&target(), "hello", &VoiceOptions::default(), false, false)
            .await
            .unwrap();

        let sent = &envelope.forward_result.response_data["got"];
        assert!(sent.get("audio_data").is_none());
        assert!(sent.get("metadata").is_none());
        assert_eq!(sent["text_to_voice"].get("file_path"), None::<&Value>);
        assert!(envelope.result.audio_ref().is_none());
    }

    #[tokio::test]
    async fn test_text_to_voice_batch_carries_original_index() {
        let service = service(echo_transport());
        let texts = vec!["fail".to_string(), "second".to_string()];

        let envelope = service
            .forward_text_to_voice_batch(
                &target(),
                &texts,
                &VoiceOptions {
                    language: "de".into(),
                    slow: true,
                },
                false,
                true,
                3,
            )
            .await
            .unwrap();

        assert_eq!(envelope.forward_results.len(), 1);
        let outcome = &envelope.forward_results[0];
        assert_eq!(outcome.index, 0);
        let sent = &outcome.response_data["got"];
        assert_eq!(sent["metadata"]["batch_index"], json!(1));
        assert_eq!(sent["metadata"]["language"], json!("de"));
        assert_eq!(sent["metadata"]["slow"], json!(true));
    }
}
