//! Photobox Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by the storage, processing and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    BaseConfig, Config, GalleryConfig, IngestLimits, ListingMode, ListingSettings,
    ThumbnailSettings,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{GalleryEntry, NamesPage, Page, PageRequest};
