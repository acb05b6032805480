//! Audio inputs and generated-audio handles.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// File extensions (without the dot) accepted for transcription uploads.
pub const SUPPORTED_AUDIO_FORMATS: &[&str] = &["wav", "mp3", "flac", "m4a", "ogg", "aac"];

/// Resolve the audio format of an uploaded file from its extension.
///
/// Matching is case-insensitive. Returns `None` for files without an
/// extension or with an extension outside [`SUPPORTED_AUDIO_FORMATS`].
pub fn audio_format(filename: &str) -> Option<String> {
    let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_AUDIO_FORMATS
        .contains(&extension.as_str())
        .then_some(extension)
}

/// An uploaded audio file awaiting transcription.
#[derive(Debug, Clone, Default)]
pub struct AudioUpload {
    /// Client-supplied file name, if any.
    pub filename: Option<String>,
    /// Raw audio bytes as uploaded.
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            bytes: bytes.into(),
        }
    }
}

/// Handle to audio generated by a synthesis engine.
///
/// The engine decides where the audio lives. An optional owner value is kept
/// alive for as long as any clone of the handle exists, which lets engines
/// tie temp-file cleanup to the last consumer dropping its handle.
#[derive(Clone)]
pub struct AudioRef {
    path: PathBuf,
    owner: Option<Arc<dyn Any + Send + Sync>>,
}

impl AudioRef {
    /// Reference audio at `path` without any ownership guard.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            owner: None,
        }
    }

    /// Reference audio at `path`, keeping `owner` alive until the last clone drops.
    pub fn with_owner<T>(path: impl Into<PathBuf>, owner: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            path: path.into(),
            owner: Some(Arc::new(owner)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the referenced audio without blocking the runtime.
    pub async fn load(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

impl fmt::Debug for AudioRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioRef")
            .field("path", &self.path)
            .field("owned", &self.owner.is_some())
            .finish()
    }
}

impl Serialize for AudioRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.path.display())
    }
}
