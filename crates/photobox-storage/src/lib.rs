//! Photobox Storage Library
//!
//! This crate provides the storage abstraction and the local filesystem
//! implementation used for originals and thumbnails.
//!
//! # Layout
//!
//! Two flat directories ("buckets") hold the data:
//!
//! - **Originals**: `{originals_dir}/{name}`
//! - **Thumbnails**: `{thumbnails_dir}/{name}`
//!
//! A thumbnail always carries exactly its original's name. Names are validated
//! through [`LogicalName`] before they are joined into any path; path mapping is
//! centralized in [`StorageLayout`].

pub mod layout;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use layout::{LogicalName, StorageLayout};
pub use local::LocalStorage;
pub use traits::{Bucket, ByteStream, Storage, StorageError, StorageResult, StoredObject};
