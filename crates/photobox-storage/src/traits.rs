//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::layout::LogicalName;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Readable upload body.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// The two flat namespaces of the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Originals,
    Thumbnails,
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Bucket::Originals => write!(f, "originals"),
            Bucket::Thumbnails => write!(f, "thumbnails"),
        }
    }
}

/// A stored file as seen by a directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: LogicalName,
    pub modified: DateTime<Utc>,
}

/// Storage abstraction trait
///
/// Writes are atomic: a reader sees either the previous content or the new
/// content of a name, never a partially written file. Concurrent writers of the
/// same name race with last-writer-wins semantics.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write a file from a stream, returning the number of bytes written.
    ///
    /// Large originals are copied to disk without being held in memory.
    async fn put_stream(
        &self,
        bucket: Bucket,
        name: &LogicalName,
        reader: ByteStream,
    ) -> StorageResult<u64>;

    /// Write a file from an in-memory buffer.
    async fn put(&self, bucket: Bucket, name: &LogicalName, data: Vec<u8>) -> StorageResult<()>;

    /// Read a whole file.
    async fn get(&self, bucket: Bucket, name: &LogicalName) -> StorageResult<Vec<u8>>;

    /// Read a file as a stream of chunks (for large files)
    async fn get_stream(
        &self,
        bucket: Bucket,
        name: &LogicalName,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>>;

    /// Check if a file exists
    async fn exists(&self, bucket: Bucket, name: &LogicalName) -> StorageResult<bool>;

    /// Enumerate the regular files of a bucket, non-recursively, ordered by name.
    ///
    /// Entries whose names are not valid logical names are skipped.
    async fn list(&self, bucket: Bucket) -> StorageResult<Vec<StoredObject>>;

    /// Verify that every bucket is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}
