//! Conversion service - validates inputs and drives the speech engines.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    AudioUpload, BatchConversion, BatchKind, ConversionResult, SUPPORTED_AUDIO_FORMATS,
    SynthesisResult, TextInputResult, TranscriptionResult, audio_format,
};
use crate::error::AdapterError;
use crate::ports::{ConversionError, SynthesisPort, TranscriptionPort};

/// Characters of input text echoed back in batch synthesis results.
const TEXT_PREVIEW_CHARS: usize = 100;

/// Service for the non-forwarding conversions.
pub struct ConversionService {
    transcriber: Arc<dyn TranscriptionPort>,
    synthesizer: Arc<dyn SynthesisPort>,
    max_batch_items: usize,
}

impl ConversionService {
    pub fn new(
        transcriber: Arc<dyn TranscriptionPort>,
        synthesizer: Arc<dyn SynthesisPort>,
        max_batch_items: usize,
    ) -> Self {
        Self {
            transcriber,
            synthesizer,
            max_batch_items,
        }
    }

    pub fn transcription_engine(&self) -> &str {
        self.transcriber.engine_name()
    }

    pub fn synthesis_engine(&self) -> &str {
        self.synthesizer.engine_name()
    }

    pub fn synthesis_media_type(&self) -> &str {
        self.synthesizer.media_type()
    }

    /// Transcribe one uploaded audio file.
    ///
    /// The file name must carry a supported extension and the upload must
    /// not be empty; both are checked before the engine is called.
    pub async fn transcribe(
        &self,
        upload: &AudioUpload,
        language: &str,
    ) -> Result<TranscriptionResult, AdapterError> {
        self.try_transcribe(upload, language)
            .await
            .map_err(|e| AdapterError::conversion("transcription", e))
    }

    async fn try_transcribe(
        &self,
        upload: &AudioUpload,
        language: &str,
    ) -> Result<TranscriptionResult, ConversionError> {
        let filename = upload
            .filename
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ConversionError::UnsupportedFormat("no file name provided".into()))?;

        let format = audio_format(filename).ok_or_else(|| {
            ConversionError::UnsupportedFormat(format!(
                "{filename}. Supported formats: {}",
                SUPPORTED_AUDIO_FORMATS.join(", ")
            ))
        })?;

        if upload.bytes.is_empty() {
            return Err(ConversionError::EmptyInput);
        }

        debug!(filename, format = %format, bytes = upload.bytes.len(), "Transcribing audio");
        let transcript = self
            .transcriber
            .transcribe(&upload.bytes, &format, language)
            .await?;

        info!(filename, chars = transcript.text.chars().count(), "Transcription complete");
        Ok(TranscriptionResult::succeeded(
            filename,
            transcript.text,
            transcript.language,
            format,
        ))
    }

    /// Transcribe several files independently.
    ///
    /// A file that fails is reported as an unsuccessful item; it never stops
    /// the remaining files from being processed.
    pub async fn transcribe_batch(
        &self,
        uploads: &[AudioUpload],
        language: &str,
    ) -> Result<BatchConversion, AdapterError> {
        self.check_batch_size(uploads.len(), "files")?;

        let mut results = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let result = match self.try_transcribe(upload, language).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(filename = ?upload.filename, error = %e, "Batch item transcription failed");
                    TranscriptionResult::failed(upload.filename.clone(), language, e.to_string())
                }
            };
            results.push(ConversionResult::Transcription(result));
        }

        Ok(BatchConversion::new(
            BatchKind::Transcription,
            results,
            self.transcription_engine().to_string(),
        ))
    }

    /// Synthesize speech for `text`. The result holds the audio reference.
    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        slow: bool,
    ) -> Result<SynthesisResult, AdapterError> {
        self.try_synthesize(text, language, slow)
            .await
            .map_err(|e| AdapterError::conversion("text-to-voice", e))
    }

    /// Synthesize speech and report only the summary. The generated audio is released.
    pub async fn synthesize_info(
        &self,
        text: &str,
        language: &str,
        slow: bool,
    ) -> Result<SynthesisResult, AdapterError> {
        let mut result = self.synthesize(text, language, slow).await?;
        result.audio_ref = None;
        result.filename = None;
        Ok(result)
    }

    async fn try_synthesize(
        &self,
        text: &str,
        language: &str,
        slow: bool,
    ) -> Result<SynthesisResult, ConversionError> {
        if text.trim().is_empty() {
            return Err(ConversionError::EmptyInput);
        }

        let audio = self.synthesizer.synthesize(text, language, slow).await?;
        info!(
            language,
            slow,
            bytes = audio.file_size_bytes,
            "Speech synthesis complete"
        );

        Ok(SynthesisResult {
            success: true,
            index: None,
            message: Some("Text-to-speech conversion successful".to_string()),
            text: None,
            text_length: text.chars().count(),
            language: language.to_string(),
            slow,
            file_size_bytes: Some(audio.file_size_bytes),
            tts_engine: self.synthesis_engine().to_string(),
            output_format: self.synthesizer.output_format().to_string(),
            audio_ref: Some(audio.audio),
            filename: Some(format!("speech.{}", self.synthesizer.output_format())),
            error: None,
        })
    }

    /// Synthesize several texts independently, keeping each audio reference.
    pub async fn synthesize_batch(
        &self,
        texts: &[String],
        language: &str,
        slow: bool,
    ) -> Result<BatchConversion, AdapterError> {
        self.check_batch_size(texts.len(), "texts")?;

        let mut results = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            let result = match self.try_synthesize(text, language, slow).await {
                Ok(mut result) => {
                    result.index = Some(index);
                    result.message = None;
                    result.text = Some(preview(text));
                    result.filename =
                        Some(format!("batch_speech_{index}.{}", result.output_format));
                    result
                }
                Err(e) => {
                    warn!(index, error = %e, "Batch item synthesis failed");
                    SynthesisResult {
                        success: false,
                        index: Some(index),
                        message: None,
                        text: Some(preview(text)),
                        text_length: text.chars().count(),
                        language: language.to_string(),
                        slow,
                        file_size_bytes: None,
                        tts_engine: self.synthesis_engine().to_string(),
                        output_format: self.synthesizer.output_format().to_string(),
                        audio_ref: None,
                        filename: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(ConversionResult::SpeechSynthesis(result));
        }

        Ok(BatchConversion::new(
            BatchKind::SpeechSynthesis,
            results,
            self.synthesis_engine().to_string(),
        ))
    }

    /// Acknowledge raw text received from a UI or other producer.
    pub fn receive_text(
        &self,
        text: &str,
        source: &str,
        timestamp: Option<String>,
    ) -> Result<TextInputResult, AdapterError> {
        if text.trim().is_empty() {
            return Err(AdapterError::Validation("Text must not be empty".into()));
        }
        info!(source, preview = %preview(text), "Received text");
        Ok(TextInputResult::received(text, source, timestamp))
    }

    fn check_batch_size(&self, len: usize, noun: &str) -> Result<(), AdapterError> {
        if len == 0 {
            return Err(AdapterError::Validation(format!("No {noun} provided")));
        }
        if len > self.max_batch_items {
            return Err(AdapterError::Validation(format!(
                "Maximum {} {noun} allowed per batch",
                self.max_batch_items
            )));
        }
        Ok(())
    }
}

/// First 100 characters of `text`, with `...` appended when it was cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(TEXT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
