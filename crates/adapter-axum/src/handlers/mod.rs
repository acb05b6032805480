//! HTTP request handlers for the Axum web server.
//!
//! Handlers are thin: they read the form, call one service method and turn
//! the result into JSON or an audio response.

pub mod conversion;
pub mod forwarding;
pub mod info;
pub mod workflow;

use adapter_core::AudioRef;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::error::HttpError;

/// Header value for arbitrary text.
///
/// Text made only of visible ASCII and spaces is sent as is; anything else
/// (newlines, accents, emoji) is percent-encoded as a whole.
pub fn header_text(text: &str) -> HeaderValue {
    let plain = text.bytes().all(|b| (0x20..0x7f).contains(&b));
    let value = if plain {
        HeaderValue::from_str(text)
    } else {
        HeaderValue::from_str(&urlencoding::encode(text))
    };
    value.unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Respond with the referenced audio as an attachment.
pub(crate) async fn audio_response(
    audio: &AudioRef,
    media_type: &str,
    filename: &str,
    extra: &[(&'static str, String)],
) -> Result<Response, HttpError> {
    let bytes = audio
        .load()
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to read generated audio: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, header_text(media_type));
    let safe_name = filename.replace('"', "");
    headers.insert(
        CONTENT_DISPOSITION,
        header_text(&format!("attachment; filename=\"{safe_name}\"")),
    );
    for (name, value) in extra {
        headers.insert(HeaderName::from_static(*name), header_text(value));
    }

    Ok((headers, bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text_plain_ascii_unchanged() {
        assert_eq!(header_text("hello world"), "hello world");
    }

    #[test]
    fn test_header_text_encodes_non_ascii_and_controls() {
        assert_eq!(header_text("héllo"), "h%C3%A9llo");
        assert_eq!(header_text("a\nb"), "a%0Ab");
    }
}
