//! Image processing module
//!
//! - EXIF orientation detection and normalization (orientation)
//! - Decoding, box-fitting and re-encoding of thumbnails (thumbnail)

pub mod orientation;
pub mod thumbnail;

pub use orientation::{OrientationResolver, Transform};
pub use thumbnail::{decode, ProcessingError, RenderedThumbnail, ThumbnailDeriver};

use image::ImageFormat;
use photobox_storage::LogicalName;

/// MIME type guessed from the name's extension.
pub fn content_type_for(name: &LogicalName) -> &'static str {
    ImageFormat::from_path(name.as_str())
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}
