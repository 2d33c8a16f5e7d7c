//! Storage setup and initialization

use anyhow::{Context, Result};
use photobox_core::Config;
use photobox_storage::{LocalStorage, Storage, StorageLayout};
use std::sync::Arc;

/// Create both bucket directories and verify they are usable.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing local storage...");
    let layout = StorageLayout::new(config.originals_dir(), config.thumbnails_dir());
    let storage = LocalStorage::new(layout)
        .await
        .context("Failed to create storage directories")?;
    storage
        .health_check()
        .await
        .context("Storage health check failed")?;

    tracing::info!(
        originals_dir = %config.originals_dir().display(),
        thumbnails_dir = %config.thumbnails_dir().display(),
        "Local storage initialized successfully"
    );

    Ok(Arc::new(storage))
}
