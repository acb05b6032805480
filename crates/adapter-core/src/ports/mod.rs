//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the services expect from infrastructure: the
//! outbound HTTP transport and the two speech engines. They use only domain
//! types; no HTTP client or engine types appear in any signature.

pub mod speech;
pub mod transport;

pub use speech::{ConversionError, SynthesisPort, SynthesizedAudio, Transcript, TranscriptionPort};
pub use transport::{CustomHeaders, ForwardTransport};

#[cfg(test)]
pub use transport::MockForwardTransport;
