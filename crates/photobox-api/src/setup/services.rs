//! Service initialization

use crate::state::AppState;
use photobox_core::Config;
use photobox_processing::{GalleryLister, UploadPipeline};
use photobox_storage::Storage;
use std::sync::Arc;

/// Build the upload pipeline and gallery lister over a shared storage.
pub fn initialize_services(config: &Config, storage: Arc<dyn Storage>) -> Arc<AppState> {
    let limits = config.ingest_limits();
    let upload_thumbnails = config.upload_thumbnails();
    let backfill_thumbnails = config.backfill_thumbnails();
    let listing = config.listing();

    tracing::info!(
        max_files = limits.max_files,
        max_file_size_bytes = limits.max_file_size_bytes,
        atomic_admission = limits.atomic_admission,
        upload_thumbnail_quality = upload_thumbnails.quality,
        backfill_thumbnail_quality = backfill_thumbnails.quality,
        thumbnail_max_dimension = ?upload_thumbnails.max_dimension,
        page_size = listing.page_size,
        listing_mode = %listing.mode,
        "Gallery services configured"
    );

    let pipeline = UploadPipeline::new(storage.clone(), limits, upload_thumbnails);
    let lister = GalleryLister::new(storage.clone(), backfill_thumbnails, listing);

    Arc::new(AppState {
        config: config.clone(),
        storage,
        pipeline,
        lister,
    })
}
