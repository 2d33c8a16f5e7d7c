//! Default limits and settings.
//!
//! These values reproduce the behavior of the original single-node gallery;
//! every one of them can be overridden through the environment (see `config`).

/// Maximum number of files accepted in one upload batch.
pub const DEFAULT_MAX_FILES: usize = 20;

/// Maximum size of a single uploaded file, in mebibytes (1 GiB).
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 1024;

/// Number of entries on one gallery page.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// JPEG quality of thumbnails written at upload time.
pub const DEFAULT_UPLOAD_THUMBNAIL_QUALITY: u8 = 95;

/// JPEG quality of thumbnails regenerated lazily while listing.
pub const DEFAULT_BACKFILL_THUMBNAIL_QUALITY: u8 = 20;

/// Directory holding uploaded originals.
pub const DEFAULT_ORIGINALS_DIR: &str = "uploads";

/// Directory holding derived thumbnails.
pub const DEFAULT_THUMBNAILS_DIR: &str = "thumbnails";

/// URL prefix under which thumbnails are served.
pub const DEFAULT_THUMBNAIL_URL_PREFIX: &str = "/thumbnails";

/// URL prefix under which originals are served.
pub const ORIGINALS_URL_PREFIX: &str = "/uploads";

/// Multipart field carrying the uploaded files.
pub const UPLOAD_FIELD_NAME: &str = "files";

/// Longest accepted logical file name, in bytes.
pub const MAX_FILENAME_LENGTH: usize = 255;

pub const BYTES_PER_MB: u64 = 1024 * 1024;
