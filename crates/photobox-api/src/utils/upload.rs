//! Multipart spooling for upload batches.
//!
//! Each file part is copied to a private temporary file so the pipeline can
//! stream originals to storage without holding them in memory. Parts that can
//! never be admitted (beyond the file count, or past the size limit) are
//! counted but not written.

use axum::extract::Multipart;
use photobox_core::constants::UPLOAD_FIELD_NAME;
use photobox_core::{AppError, IngestLimits};
use photobox_processing::IncomingFile;
use std::io::SeekFrom;
use tempfile::TempDir;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::error::HttpAppError;

/// Spooled batch. The temporary files live as long as this value.
pub struct SpooledBatch {
    pub files: Vec<IncomingFile>,
    _dir: TempDir,
}

/// Reduce a client-supplied file name to its final path component.
///
/// Browsers may send full paths (`C:\Users\me\cat.jpg`); either separator
/// is accepted.
pub fn client_file_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// Copy every `files` part of the request to disk, in order.
pub async fn spool_multipart(
    mut multipart: Multipart,
    limits: IngestLimits,
) -> Result<SpooledBatch, HttpAppError> {
    let dir = tempfile::tempdir()
        .map_err(|e| AppError::Internal(format!("Failed to create spool directory: {}", e)))?;
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        // An empty file input still sends a part, with an empty file name.
        let Some(raw_name) = field.file_name().filter(|n| !n.is_empty()) else {
            continue;
        };
        let name = client_file_name(raw_name).to_string();
        let index = files.len();

        let path = dir.path().join(index.to_string());
        let mut spool: Option<File> = if index < limits.max_files {
            Some(open_spool_file(&path).await?)
        } else {
            None
        };

        let mut size: u64 = 0;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            if size > limits.max_file_size_bytes {
                spool = None;
            }
            if let Some(file) = spool.as_mut() {
                file.write_all(&chunk).await.map_err(|e| {
                    AppError::Internal(format!("Failed to spool upload: {}", e))
                })?;
            }
        }

        let file = match spool {
            Some(mut file) => {
                rewind(&mut file).await?;
                IncomingFile::new(name, size, Box::pin(file))
            }
            None => IncomingFile::new(name, size, Box::pin(tokio::io::empty())),
        };

        tracing::debug!(index, name = %file.name, size_bytes = size, "Upload part spooled");
        files.push(file);
    }

    Ok(SpooledBatch { files, _dir: dir })
}

async fn open_spool_file(path: &std::path::Path) -> Result<File, HttpAppError> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create spool file: {}", e)).into())
}

async fn rewind(file: &mut File) -> Result<(), HttpAppError> {
    file.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to flush spool file: {}", e)))?;
    file.seek(SeekFrom::Start(0))
        .await
        .map_err(|e| AppError::Internal(format!("Failed to rewind spool file: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_file_name_strips_directories() {
        assert_eq!(client_file_name("cat.jpg"), "cat.jpg");
        assert_eq!(client_file_name("photos/2024/cat.jpg"), "cat.jpg");
        assert_eq!(client_file_name("C:\\Users\\me\\cat.jpg"), "cat.jpg");
        assert_eq!(client_file_name("../../etc/passwd"), "passwd");
        assert_eq!(client_file_name("dir/"), "");
        assert_eq!(client_file_name(".."), "..");
    }
}
