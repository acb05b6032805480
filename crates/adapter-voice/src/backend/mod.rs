//! Engine implementations of the conversion ports.

pub mod google_tts;
pub mod openai_stt;

use adapter_core::ConversionError;

/// Map an HTTP failure status from an engine to a conversion error.
///
/// Server-side failures mean the engine is unavailable; anything else is
/// a rejected conversion.
pub(crate) fn status_error(status: reqwest::StatusCode, body: &str) -> ConversionError {
    let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        ConversionError::ServiceUnavailable(message)
    } else {
        ConversionError::Failed(message)
    }
}
