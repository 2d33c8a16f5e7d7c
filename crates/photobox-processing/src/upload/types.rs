//! Types for the upload pipeline.

use photobox_core::AppError;
use photobox_storage::{ByteStream, StorageError};
use std::fmt;
use std::io::Cursor;

use crate::image::ProcessingError;
use crate::validator::Rejection;

/// One file of an upload batch. The content is read once, when the original
/// is persisted.
pub struct IncomingFile {
    pub name: String,
    /// Declared size in bytes, checked against the per-file limit.
    pub size: u64,
    pub content: ByteStream,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, size: u64, content: ByteStream) -> Self {
        Self {
            name: name.into(),
            size,
            content,
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self::new(name, size, Box::pin(Cursor::new(data)))
    }
}

impl fmt::Debug for IncomingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Reason a batch stopped before completing.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("failed to save {name}: {source}")]
    PersistenceFailed {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("failed to open image {name}: {source}")]
    DecodeFailed {
        name: String,
        #[source]
        source: ProcessingError,
    },

    #[error("failed to save thumbnail {name}: {source}")]
    ThumbnailFailed {
        name: String,
        #[source]
        source: ProcessingError,
    },
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Rejected(rejection) => AppError::AdmissionRejected(rejection.to_string()),
            IngestError::PersistenceFailed { name, source } => {
                AppError::PersistenceFailed(format!("{}: {}", name, source))
            }
            IngestError::DecodeFailed { source, .. } => {
                AppError::DecodeFailed(format!("Failed to open image: {}", source))
            }
            IngestError::ThumbnailFailed { source, .. } => {
                AppError::ThumbnailFailed(format!("Failed to save thumbnail: {}", source))
            }
        }
    }
}

/// What happened to a batch: the names persisted in order and, if the batch
/// stopped early, why.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub succeeded: Vec<String>,
    pub error: Option<IngestError>,
}

impl IngestReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<String>, IngestError> {
        match self.error {
            None => Ok(self.succeeded),
            Some(err) => Err(err),
        }
    }
}
