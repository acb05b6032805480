//! Chained voice-to-voice workflow.
//!
//! ```text
//!  RECEIVED ──transcribe──▶ CONVERTED ──forward──▶ FORWARDED
//!      ──extract reply──▶ EXTRACTED ──synthesize──▶ SYNTHESIZED ──▶ COMPLETE
//! ```
//!
//! Every transition is one-way. A failure ends the workflow and is reported
//! with the stage it happened in. Nothing that already happened is undone:
//! a transcription that was forwarded stays forwarded.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{AudioRef, AudioUpload, SessionInfo};
use crate::extract::extract_reply_text;
use crate::payload::build_transcription_payload;
use crate::ports::ForwardTransport;

use super::conversion::ConversionService;
use super::forwarding::{ForwardTarget, VoiceOptions};

// ── Stages ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStage {
    Received,
    Converted,
    Forwarded,
    Extracted,
    Synthesized,
    Complete,
}

impl WorkflowStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Converted => "CONVERTED",
            Self::Forwarded => "FORWARDED",
            Self::Extracted => "EXTRACTED",
            Self::Synthesized => "SYNTHESIZED",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of the workflow, tagged with the failing stage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct WorkflowError {
    pub stage: WorkflowStage,
    /// HTTP-equivalent status.
    pub status: u16,
    pub message: String,
}

impl WorkflowError {
    fn new(stage: WorkflowStage, status: u16, message: impl Into<String>) -> Self {
        Self {
            stage,
            status,
            message: message.into(),
        }
    }
}

// ── Context ──────────────────────────────────────────────────────────

/// Per-request state accumulated while the workflow runs.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub session: SessionInfo,
    stage: WorkflowStage,
    pub original_text: Option<String>,
    pub forward_response: Option<Value>,
    pub extracted_text: Option<String>,
}

impl WorkflowContext {
    pub const fn new(session: SessionInfo) -> Self {
        Self {
            session,
            stage: WorkflowStage::Received,
            original_text: None,
            forward_response: None,
            extracted_text: None,
        }
    }

    pub const fn stage(&self) -> WorkflowStage {
        self.stage
    }

    /// Move forward to `next`. Stages never go backwards.
    fn advance(&mut self, next: WorkflowStage) {
        debug_assert!(next > self.stage, "{} -> {next}", self.stage);
        self.stage = next;
    }

    fn fail(&self, status: u16, message: impl Into<String>) -> WorkflowError {
        let err = WorkflowError::new(self.stage, status, message);
        error!(stage = %err.stage, status = err.status, error = %err.message, "Voice-to-voice workflow failed");
        err
    }
}

// ── Request / reply ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub upload: AudioUpload,
    pub session: SessionInfo,
    /// Language tag passed to the transcription engine.
    pub transcription_language: String,
    /// Language and pace of the spoken reply.
    pub voice: VoiceOptions,
}

/// Spoken reply produced by a completed workflow.
#[derive(Debug, Clone)]
pub struct WorkflowReply {
    pub audio: AudioRef,
    pub file_size_bytes: u64,
    pub media_type: String,
    pub filename: String,
    pub original_text: String,
    pub response_text: String,
    pub session: SessionInfo,
    pub stage: WorkflowStage,
}

// ── Workflow ─────────────────────────────────────────────────────────

pub struct VoiceWorkflow {
    conversion: Arc<ConversionService>,
    transport: Arc<dyn ForwardTransport>,
}

impl VoiceWorkflow {
    pub fn new(conversion: Arc<ConversionService>, transport: Arc<dyn ForwardTransport>) -> Self {
        Self {
            conversion,
            transport,
        }
    }

    pub async fn run(
        &self,
        target: &ForwardTarget,
        request: WorkflowRequest,
    ) -> Result<WorkflowReply, WorkflowError> {
        let WorkflowRequest {
            upload,
            session,
            transcription_language,
            voice,
        } = request;
        let mut ctx = WorkflowContext::new(session);

        info!(session_id = ?ctx.session.session_id, "Converting voice to text");
        let mut transcription = self
            .conversion
            .transcribe(&upload, &transcription_language)
            .await
            .map_err(|e| ctx.fail(400, format!("Failed to transcribe audio: {e}")))?;
        ctx.original_text = transcription.text.clone();
        ctx.advance(WorkflowStage::Converted);

        if !ctx.session.is_empty() {
            transcription.session_info = Some(ctx.session.clone());
        }
        let payload = build_transcription_payload(
            &transcription,
            &ctx.session,
            self.conversion.transcription_engine(),
            true,
        );
        info!(url = %target.url, "Forwarding transcription");
        let outcome = self
            .transport
            .dispatch(&target.url, &payload, &target.headers, target.method)
            .await;
        if !outcome.success {
            let detail = outcome.error.as_deref().unwrap_or("unknown error");
            return Err(ctx.fail(
                500,
                format!("Failed to forward transcription to external API: {detail}"),
            ));
        }
        ctx.forward_response = Some(outcome.response_data);
        ctx.advance(WorkflowStage::Forwarded);

        let response_text = ctx
            .forward_response
            .as_ref()
            .and_then(extract_reply_text)
            .ok_or_else(|| ctx.fail(500, "No text field found in external API response"))?;
        info!(chars = response_text.chars().count(), "Extracted response text");
        ctx.extracted_text = Some(response_text.clone());
        ctx.advance(WorkflowStage::Extracted);

        let speech = self
            .conversion
            .synthesize(&response_text, &voice.language, voice.slow)
            .await
            .map_err(|e| ctx.fail(500, format!("Failed to synthesize response: {e}")))?;
        ctx.advance(WorkflowStage::Synthesized);

        let audio = speech
            .audio_ref
            .ok_or_else(|| ctx.fail(500, "Speech engine returned no audio"))?;
        ctx.advance(WorkflowStage::Complete);

        let filename = format!(
            "response_{}.{}",
            ctx.session.session_id.as_deref().unwrap_or("audio"),
            speech.output_format
        );
        info!(session_id = ?ctx.session.session_id, "Voice-to-voice workflow complete");

        Ok(WorkflowReply {
            audio,
            file_size_bytes: speech.file_size_bytes.unwrap_or(0),
            media_type: self.conversion.synthesis_media_type().to_string(),
            filename,
            original_text: ctx.original_text.unwrap_or_default(),
            response_text,
            session: ctx.session,
            stage: ctx.stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_are_ordered() {
        assert!(WorkflowStage::Received < WorkflowStage::Converted);
        assert!(WorkflowStage::Extracted < WorkflowStage::Synthesized);
        assert!(WorkflowStage::Synthesized < WorkflowStage::Complete);
        assert_eq!(WorkflowStage::Forwarded.to_string(), "FORWARDED");
        assert_eq!(
            serde_json::to_value(WorkflowStage::Complete).unwrap(),
            serde_json::json!("COMPLETE")
        );
    }

    #[test]
    fn test_context_failure_carries_current_stage() {
        let mut ctx = WorkflowContext::new(SessionInfo::default());
        ctx.advance(WorkflowStage::Converted);
        ctx.advance(WorkflowStage::Forwarded);
        let err = ctx.fail(500, "No text field found in external API response");
        assert_eq!(err.stage, WorkflowStage::Forwarded);
        assert_eq!(err.to_string(), "No text field found in external API response");
    }
}
