//! Domain types for conversion results, dispatch outcomes and envelopes.
//!
//! These are pure data types with no infrastructure dependencies. Everything
//! here is request-scoped; nothing is shared across requests.

mod audio;
mod conversion;
mod envelope;
mod outcome;

pub use audio::{AudioRef, AudioUpload, SUPPORTED_AUDIO_FORMATS, audio_format};
pub use conversion::{
    ConversionKind, ConversionResult, SessionInfo, SynthesisResult, TextInputResult,
    TranscriptionResult,
};
pub use envelope::{BatchConversion, BatchForwardingEnvelope, BatchKind, ForwardingEnvelope};
pub use outcome::{BatchSummary, ForwardOutcome, HttpMethod, parse_response_body};
