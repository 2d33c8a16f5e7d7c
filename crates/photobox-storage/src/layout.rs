//! Logical file names and their on-disk locations.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

use photobox_core::constants::MAX_FILENAME_LENGTH;

use crate::traits::{Bucket, StorageError, StorageResult};

/// Name of the per-bucket directory used for atomic writes.
pub(crate) const STAGING_DIR: &str = ".staging";

/// A file name that is safe to join onto a bucket directory.
///
/// Rejects empty names, `.` and `..`, path separators of either platform, NUL
/// bytes, the reserved staging directory name and names longer than 255
/// bytes. Any other name is kept verbatim, so an original and its thumbnail
/// always share the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalName(String);

impl LogicalName {
    pub fn parse(raw: &str) -> StorageResult<Self> {
        if raw.is_empty() {
            return Err(StorageError::InvalidKey("file name is empty".to_string()));
        }
        if raw == "." || raw == ".." {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a file name",
                raw
            )));
        }
        if raw == STAGING_DIR {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is reserved",
                raw
            )));
        }
        if raw.contains(['/', '\\']) {
            return Err(StorageError::InvalidKey(format!(
                "'{}' contains a path separator",
                raw.escape_debug()
            )));
        }
        if raw.contains('\0') {
            return Err(StorageError::InvalidKey(
                "file name contains a NUL byte".to_string(),
            ));
        }
        if raw.len() > MAX_FILENAME_LENGTH {
            return Err(StorageError::InvalidKey(format!(
                "file name exceeds {} bytes",
                MAX_FILENAME_LENGTH
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for LogicalName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps logical names to paths. Pure; performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    originals_dir: PathBuf,
    thumbnails_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(originals_dir: impl Into<PathBuf>, thumbnails_dir: impl Into<PathBuf>) -> Self {
        Self {
            originals_dir: originals_dir.into(),
            thumbnails_dir: thumbnails_dir.into(),
        }
    }

    pub fn original_path(&self, name: &LogicalName) -> PathBuf {
        self.originals_dir.join(name.as_str())
    }

    pub fn thumbnail_path(&self, name: &LogicalName) -> PathBuf {
        self.thumbnails_dir.join(name.as_str())
    }

    pub fn path_for(&self, bucket: Bucket, name: &LogicalName) -> PathBuf {
        match bucket {
            Bucket::Originals => self.original_path(name),
            Bucket::Thumbnails => self.thumbnail_path(name),
        }
    }

    pub fn bucket_dir(&self, bucket: Bucket) -> &Path {
        match bucket {
            Bucket::Originals => &self.originals_dir,
            Bucket::Thumbnails => &self.thumbnails_dir,
        }
    }

    /// Scratch directory inside a bucket. It is a subdirectory, so bucket
    /// enumeration (files only) never sees in-flight writes.
    pub fn staging_dir(&self, bucket: Bucket) -> PathBuf {
        self.bucket_dir(bucket).join(STAGING_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_plain_names() {
        for raw in ["beach.jpg", "IMG 0042.JPG", ".hidden.png", "ünïcødé.webp", "a..b.png"] {
            let name = LogicalName::parse(raw).unwrap();
            assert_eq!(name.as_str(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_traversal_and_separators() {
        for raw in [
            "",
            ".",
            "..",
            "../etc/passwd",
            "a/b.jpg",
            "/abs.jpg",
            "..\\windows.ini",
            "dir\\file.png",
            "nul\0byte.jpg",
            ".staging",
        ] {
            assert!(
                matches!(LogicalName::parse(raw), Err(StorageError::InvalidKey(_))),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_parse_rejects_overlong_names() {
        let raw = format!("{}.jpg", "a".repeat(MAX_FILENAME_LENGTH));
        assert!(LogicalName::parse(&raw).is_err());
    }

    #[test]
    fn test_thumbnail_mirrors_original_name() {
        let layout = StorageLayout::new("/srv/uploads", "/srv/thumbnails");
        let name = LogicalName::parse("sunset.jpg").unwrap();

        assert_eq!(layout.original_path(&name), PathBuf::from("/srv/uploads/sunset.jpg"));
        assert_eq!(layout.thumbnail_path(&name), PathBuf::from("/srv/thumbnails/sunset.jpg"));
        assert_eq!(
            layout.original_path(&name).file_name(),
            layout.thumbnail_path(&name).file_name()
        );
    }

    #[test]
    fn test_staging_dir_is_inside_bucket() {
        let layout = StorageLayout::new("/srv/uploads", "/srv/thumbnails");
        assert_eq!(
            layout.staging_dir(Bucket::Thumbnails),
            PathBuf::from("/srv/thumbnails/.staging")
        );
    }
}
