//! Core domain types, ports and services for the channel adapter.
//!
//! This crate owns everything that does not depend on a concrete HTTP client,
//! speech engine or web framework:
//!
//! - [`domain`]: conversion results, forward outcomes and response envelopes
//! - [`ports`]: trait abstractions for the forward transport and speech engines
//! - [`payload`]: pure builders for the downstream wire payloads
//! - [`headers`] / [`extract`]: caller header parsing and reply-text policy
//! - [`services`]: conversion, batch dispatch, forwarding and the voice workflow
//! - [`settings`]: runtime configuration and validation

pub mod domain;
pub mod error;
pub mod extract;
pub mod headers;
pub mod payload;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AudioRef, AudioUpload, BatchConversion, BatchForwardingEnvelope, BatchKind, BatchSummary,
    ConversionKind, ConversionResult, ForwardOutcome, ForwardingEnvelope, HttpMethod,
    SUPPORTED_AUDIO_FORMATS, SessionInfo, SynthesisResult, TextInputResult, TranscriptionResult,
    audio_format,
};
pub use error::AdapterError;
pub use extract::{REPLY_TEXT_FIELDS, extract_reply_text};
pub use headers::parse_custom_headers;
pub use payload::{
    SynthesisPayloadOptions, build_speech_synthesis_payload, build_text_input_payload,
    build_transcription_payload,
};
pub use ports::{
    ConversionError, CustomHeaders, ForwardTransport, SynthesisPort, SynthesizedAudio,
    Transcript, TranscriptionPort,
};
pub use services::{
    BatchDispatcher, ConversionService, DEFAULT_CONCURRENCY_LIMIT, ForwardTarget,
    ForwardingService, VoiceOptions, VoiceWorkflow, WorkflowContext, WorkflowError,
    WorkflowReply, WorkflowRequest, WorkflowStage, validate_concurrency_limit,
};
pub use settings::{AdapterSettings, SettingsError, validate_settings};

/// Service name reported in payload metadata and the root info endpoint.
pub const SERVICE_NAME: &str = "channel-adapter";

/// Service version reported in payload metadata.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
