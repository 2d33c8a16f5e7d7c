//! Sequential, fail-fast batch ingestion.
//!
//! Files are processed strictly in submitted order. Any error stops the
//! batch; files already written stay on disk.

use photobox_core::{IngestLimits, ThumbnailSettings};
use photobox_storage::{Bucket, LogicalName, Storage};
use std::sync::Arc;
use std::time::Instant;

use super::types::{IncomingFile, IngestError, IngestReport};
use crate::image::{ProcessingError, ThumbnailDeriver};
use crate::validator::IngestValidator;

pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    validator: IngestValidator,
    deriver: ThumbnailDeriver,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        limits: IngestLimits,
        thumbnails: ThumbnailSettings,
    ) -> Self {
        Self {
            storage,
            validator: IngestValidator::new(limits),
            deriver: ThumbnailDeriver::new(thumbnails),
        }
    }

    pub async fn ingest(&self, batch: Vec<IncomingFile>) -> IngestReport {
        let batch_size = batch.len();
        let admission = self.validator.admit(&batch);

        if let Some(rejection) = &admission.rejection {
            tracing::debug!(
                batch_size,
                admitted = admission.admitted.len(),
                offending_index = ?rejection.offending_index,
                offending_file = ?rejection.offending_file,
                reason = %rejection,
                "Upload batch rejected"
            );
        }

        let mut report = IngestReport::default();
        // zip stops at the admitted prefix
        for (file, name) in batch.into_iter().zip(admission.admitted) {
            match self.ingest_one(file, &name).await {
                Ok(()) => report.succeeded.push(name.into_string()),
                Err(e) => {
                    tracing::warn!(
                        name = %name,
                        succeeded = report.succeeded.len(),
                        error = %e,
                        "Upload batch aborted"
                    );
                    report.error = Some(e);
                    return report;
                }
            }
        }

        report.error = admission.rejection.map(IngestError::from);
        report
    }

    async fn ingest_one(&self, file: IncomingFile, name: &LogicalName) -> Result<(), IngestError> {
        let start = Instant::now();
        let persistence_failed = |source| IngestError::PersistenceFailed {
            name: name.to_string(),
            source,
        };

        let written = self
            .storage
            .put_stream(Bucket::Originals, name, file.content)
            .await
            .map_err(persistence_failed)?;

        let data = self
            .storage
            .get(Bucket::Originals, name)
            .await
            .map_err(persistence_failed)?;

        let rendered = self
            .deriver
            .render_blocking(data, name.clone())
            .await
            .map_err(|source| match source {
                ProcessingError::Decode(_) => IngestError::DecodeFailed {
                    name: name.to_string(),
                    source,
                },
                _ => IngestError::ThumbnailFailed {
                    name: name.to_string(),
                    source,
                },
            })?;

        let (width, height) = (rendered.width, rendered.height);
        self.storage
            .put(Bucket::Thumbnails, name, rendered.bytes)
            .await
            .map_err(persistence_failed)?;

        tracing::info!(
            name = %name,
            size_bytes = written,
            thumbnail_width = width,
            thumbnail_height = height,
            transform = ?rendered.transform,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "File ingested"
        );

        Ok(())
    }
}
