//! Response envelopes returned to the caller of a forwarding operation.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::conversion::ConversionResult;
use super::outcome::{BatchSummary, ForwardOutcome};

/// A single conversion result together with the outcome of forwarding it.
///
/// Serialized as `{<operation>: result, forward_result, success}` where the
/// operation key depends on the result kind (`transcription`, `text_input`
/// or `text_to_voice`).
#[derive(Debug, Clone)]
pub struct ForwardingEnvelope {
    pub result: ConversionResult,
    pub forward_result: ForwardOutcome,
}

impl ForwardingEnvelope {
    pub const fn new(result: ConversionResult, forward_result: ForwardOutcome) -> Self {
        Self {
            result,
            forward_result,
        }
    }

    /// Mirrors the single outcome.
    pub const fn success(&self) -> bool {
        self.forward_result.success
    }
}

impl Serialize for ForwardingEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(self.result.kind().operation_name(), &self.result)?;
        map.serialize_entry("forward_result", &self.forward_result)?;
        map.serialize_entry("success", &self.success())?;
        map.end()
    }
}

/// Conversions that accept a batch of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Transcription,
    SpeechSynthesis,
}

impl BatchKind {
    /// Prefix of the `<operation>_results` key in a batch envelope.
    pub const fn operation_name(self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::SpeechSynthesis => "text_to_voice",
        }
    }

    /// `type` tag carried by the batch.
    pub const fn batch_type(self) -> &'static str {
        match self {
            Self::Transcription => "voice_to_text_batch",
            Self::SpeechSynthesis => "text_to_voice_batch",
        }
    }
}

/// The per-item results of a batch conversion.
#[derive(Debug, Clone)]
pub struct BatchConversion {
    pub kind: BatchKind,
    pub results: Vec<ConversionResult>,
    pub engine: String,
}

impl BatchConversion {
    pub const fn new(kind: BatchKind, results: Vec<ConversionResult>, engine: String) -> Self {
        Self {
            kind,
            results,
            engine,
        }
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::tally(self.results.iter().map(ConversionResult::success))
    }

    /// Results that are eligible for forwarding, in input order.
    pub fn successful(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| r.success())
    }
}

impl Serialize for BatchConversion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let summary = self.summary();
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("results", &self.results)?;
        map.serialize_entry("type", self.kind.batch_type())?;
        match self.kind {
            BatchKind::SpeechSynthesis => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("total_texts", &summary.total)?;
                map.serialize_entry("successful_conversions", &summary.successful)?;
                map.serialize_entry("failed_conversions", &summary.failed)?;
                map.serialize_entry("tts_engine", &self.engine)?;
            }
            BatchKind::Transcription => {
                map.serialize_entry("total_files", &summary.total)?;
                map.serialize_entry("successful_transcriptions", &summary.successful)?;
                map.serialize_entry("failed_transcriptions", &summary.failed)?;
            }
        }
        map.end()
    }
}

/// A batch conversion together with the outcomes of forwarding its successful items.
///
/// `success` is true when at least one item was dispatched, regardless of
/// how many of those dispatches succeeded.
#[derive(Debug, Clone)]
pub struct BatchForwardingEnvelope {
    pub batch: BatchConversion,
    pub forward_results: Vec<ForwardOutcome>,
}

impl BatchForwardingEnvelope {
    pub const fn new(batch: BatchConversion, forward_results: Vec<ForwardOutcome>) -> Self {
        Self {
            batch,
            forward_results,
        }
    }

    pub fn total_items(&self) -> usize {
        self.batch.results.len()
    }

    pub fn successful_forwards(&self) -> usize {
        BatchSummary::from_outcomes(&self.forward_results).successful
    }

    pub fn success(&self) -> bool {
        !self.forward_results.is_empty()
    }
}

impl Serialize for BatchForwardingEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = format!("{}_results", self.batch.kind.operation_name());
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry(&key, &self.batch)?;
        map.serialize_entry("forward_results", &self.forward_results)?;
        map.serialize_entry("total_items", &self.total_items())?;
        map.serialize_entry("successful_forwards", &self.successful_forwards())?;
        map.serialize_entry("success", &self.success())?;
        map.end()
    }
}
