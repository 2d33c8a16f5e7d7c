use crate::layout::{LogicalName, StorageLayout};
use crate::traits::{Bucket, ByteStream, Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncRead;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    layout: StorageLayout,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating both bucket directories
    /// (and their staging directories) if needed.
    pub async fn new(layout: StorageLayout) -> StorageResult<Self> {
        for bucket in [Bucket::Originals, Bucket::Thumbnails] {
            let staging = layout.staging_dir(bucket);
            fs::create_dir_all(&staging).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "Failed to create {} directory {}: {}",
                    bucket,
                    staging.display(),
                    e
                ))
            })?;
        }

        Ok(LocalStorage { layout })
    }

    /// Copy `reader` into a staging file, fsync it, then rename it over the
    /// target so readers never observe a partial file.
    async fn write_atomic<R>(
        &self,
        bucket: Bucket,
        name: &LogicalName,
        reader: &mut R,
    ) -> StorageResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let target = self.layout.path_for(bucket, name);
        let staging = self.layout.staging_dir(bucket).join(Uuid::new_v4().to_string());

        let result = Self::copy_to(&staging, reader).await;
        let written = match result {
            Ok(written) => written,
            Err(e) => {
                discard(&staging).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&staging, &target).await {
            discard(&staging).await;
            return Err(StorageError::WriteFailed(format!(
                "Failed to move file into place at {}: {}",
                target.display(),
                e
            )));
        }

        Ok(written)
    }

    async fn copy_to<R>(path: &Path, reader: &mut R) -> StorageResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let written = tokio::io::copy(reader, &mut file).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(written)
    }

    async fn existing_path(&self, bucket: Bucket, name: &LogicalName) -> StorageResult<PathBuf> {
        let path = self.layout.path_for(bucket, name);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StorageError::NotFound(name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::ReadFailed(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove staging file");
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_stream(
        &self,
        bucket: Bucket,
        name: &LogicalName,
        mut reader: ByteStream,
    ) -> StorageResult<u64> {
        let start = std::time::Instant::now();
        let written = self.write_atomic(bucket, name, &mut reader).await?;

        tracing::info!(
            bucket = %bucket,
            name = %name,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream write successful"
        );

        Ok(written)
    }

    async fn put(&self, bucket: Bucket, name: &LogicalName, data: Vec<u8>) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let written = self.write_atomic(bucket, name, &mut data.as_slice()).await?;

        tracing::info!(
            bucket = %bucket,
            name = %name,
            size_bytes = written,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn get(&self, bucket: Bucket, name: &LogicalName) -> StorageResult<Vec<u8>> {
        let path = self.existing_path(bucket, name).await?;

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            bucket = %bucket,
            name = %name,
            size_bytes = data.len(),
            "Local storage read successful"
        );

        Ok(data)
    }

    async fn get_stream(
        &self,
        bucket: Bucket,
        name: &LogicalName,
    ) -> StorageResult<Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>> {
        let path = self.existing_path(bucket, name).await?;
        let start = std::time::Instant::now();

        let file = fs::File::open(&path).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let reader = tokio_util::io::ReaderStream::new(file);

        let stream = reader.map(|result| {
            result.map_err(|e| StorageError::ReadFailed(format!("Failed to read chunk: {}", e)))
        });

        let key = name.to_string();
        let path_display = path.display().to_string();
        let logged_stream = stream.map(move |item| {
            if item.is_err() {
                tracing::error!(
                    path = %path_display,
                    name = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream read error"
                );
            }
            item
        });

        Ok(Box::pin(logged_stream))
    }

    async fn exists(&self, bucket: Bucket, name: &LogicalName) -> StorageResult<bool> {
        match self.existing_path(bucket, name).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, bucket: Bucket) -> StorageResult<Vec<StoredObject>> {
        let dir = self.layout.bucket_dir(bucket);
        let mut entries = fs::read_dir(dir).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read directory {}: {}", dir.display(), e))
        })?;

        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read directory {}: {}", dir.display(), e))
        })? {
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let Some(raw_name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            let name = match LogicalName::parse(&raw_name) {
                Ok(name) => name,
                Err(e) => {
                    tracing::debug!(name = %raw_name.escape_debug(), error = %e, "Skipping invalid file name");
                    continue;
                }
            };
            let modified = match meta.modified() {
                Ok(modified) => DateTime::<Utc>::from(modified),
                Err(e) => {
                    tracing::debug!(name = %name, error = %e, "Skipping entry without modification time");
                    continue;
                }
            };

            objects.push(StoredObject { name, modified });
        }

        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    async fn health_check(&self) -> StorageResult<()> {
        for bucket in [Bucket::Originals, Bucket::Thumbnails] {
            let dir = self.layout.bucket_dir(bucket);
            let meta = fs::metadata(dir).await.map_err(|e| {
                StorageError::ConfigError(format!(
                    "{} directory {} unavailable: {}",
                    bucket,
                    dir.display(),
                    e
                ))
            })?;
            if !meta.is_dir() {
                return Err(StorageError::ConfigError(format!(
                    "{} path {} is not a directory",
                    bucket,
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}
