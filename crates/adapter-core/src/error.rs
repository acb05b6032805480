//! Core error type for the adapter services.

use thiserror::Error;

use crate::ports::ConversionError;

/// Errors surfaced by the conversion and forwarding services.
///
/// Dispatch failures are deliberately absent: a failed or rejected request
/// to the downstream API is a [`ForwardOutcome`](crate::ForwardOutcome)
/// value, never an `Err`.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Input rejected before any I/O (batch size, concurrency limit, empty text).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A speech engine could not convert the input.
    #[error("{operation} failed: {source}")]
    Conversion {
        operation: &'static str,
        #[source]
        source: ConversionError,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdapterError {
    pub fn conversion(operation: &'static str, source: ConversionError) -> Self {
        Self::Conversion { operation, source }
    }

    /// HTTP-equivalent status for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Conversion { source, .. } => source.status_code(),
            Self::Internal(_) => 500,
        }
    }
}
