//! Application state shared by all handlers.
//!
//! Everything here is immutable after startup; the filesystem is the only
//! mutable shared resource.

use photobox_core::Config;
use photobox_processing::{GalleryLister, UploadPipeline};
use photobox_storage::Storage;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub pipeline: UploadPipeline,
    pub lister: GalleryLister,
}
