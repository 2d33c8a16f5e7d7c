//! Gallery listing with lazy thumbnail backfill.
//!
//! Every request enumerates the originals directory; there is no index. A
//! gallery with many missing thumbnails pays the backfill cost on the first
//! listing that sees them.

use chrono::{DateTime, Utc};
use photobox_core::{GalleryEntry, ListingSettings, NamesPage, Page, PageRequest, ThumbnailSettings};
use photobox_storage::{Bucket, LogicalName, Storage, StorageError, StorageResult};
use std::sync::Arc;
use std::time::Instant;

use crate::image::{ProcessingError, ThumbnailDeriver};

#[derive(Debug, thiserror::Error)]
enum BackfillError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

pub struct GalleryLister {
    storage: Arc<dyn Storage>,
    deriver: ThumbnailDeriver,
    settings: ListingSettings,
}

impl GalleryLister {
    pub fn new(
        storage: Arc<dyn Storage>,
        backfill: ThumbnailSettings,
        settings: ListingSettings,
    ) -> Self {
        Self {
            storage,
            deriver: ThumbnailDeriver::new(backfill),
            settings,
        }
    }

    pub fn settings(&self) -> &ListingSettings {
        &self.settings
    }

    /// List one page from a raw query value.
    pub async fn list(&self, page: Option<&str>) -> StorageResult<Page> {
        self.list_page(PageRequest::parse(page)).await
    }

    /// Entries sorted by modification time, newest first, windowed to `page`.
    ///
    /// Originals without a thumbnail get one rendered and stored before the
    /// page is built; if that fails the original is left out.
    pub async fn list_page(&self, page: PageRequest) -> StorageResult<Page> {
        let start = Instant::now();
        let objects = self.storage.list(Bucket::Originals).await?;
        let total = objects.len();

        let mut entries: Vec<(LogicalName, DateTime<Utc>)> = Vec::with_capacity(total);
        let mut backfilled = 0usize;
        for object in objects {
            match self.ensure_thumbnail(&object.name).await {
                Ok(created) => {
                    if created {
                        backfilled += 1;
                    }
                    entries.push((object.name, object.modified));
                }
                Err(e) => {
                    tracing::warn!(
                        name = %object.name,
                        error = %e,
                        "Thumbnail backfill failed, omitting file from listing"
                    );
                }
            }
        }

        // Stable: equal times keep name order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        let window = page.window(entries.len(), self.settings.page_size);
        let files: Vec<GalleryEntry> = entries[window]
            .iter()
            .map(|(name, modified)| GalleryEntry {
                name: name.to_string(),
                mod_time: *modified,
                thumbnail: self.thumbnail_url(name),
            })
            .collect();

        tracing::debug!(
            page = page.number,
            total,
            backfilled,
            returned = files.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Gallery page listed"
        );

        Ok(Page { files })
    }

    /// All names in enumeration order. No pagination, no backfill.
    pub async fn list_names(&self) -> StorageResult<NamesPage> {
        let files = self
            .storage
            .list(Bucket::Originals)
            .await?
            .into_iter()
            .map(|object| object.name.into_string())
            .collect();
        Ok(NamesPage { files })
    }

    pub fn thumbnail_url(&self, name: &LogicalName) -> String {
        format!(
            "{}/{}",
            self.settings.thumbnail_url_prefix.trim_end_matches('/'),
            urlencoding::encode(name.as_str())
        )
    }

    /// Returns whether a thumbnail had to be created.
    async fn ensure_thumbnail(&self, name: &LogicalName) -> Result<bool, BackfillError> {
        if self.storage.exists(Bucket::Thumbnails, name).await? {
            return Ok(false);
        }

        let data = self.storage.get(Bucket::Originals, name).await?;
        let rendered = self.deriver.render_blocking(data, name.clone()).await?;
        self.storage
            .put(Bucket::Thumbnails, name, rendered.bytes)
            .await?;

        tracing::info!(name = %name, "Thumbnail backfilled");
        Ok(true)
    }
}
