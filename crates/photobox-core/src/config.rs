//! Configuration module
//!
//! Configuration is read once from the environment (an optional `.env` file is
//! loaded first) and then handed to each component as a narrow settings struct,
//! so limits can vary per deployment and be exercised independently in tests.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{
    BYTES_PER_MB, DEFAULT_BACKFILL_THUMBNAIL_QUALITY, DEFAULT_MAX_FILES,
    DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_ORIGINALS_DIR, DEFAULT_PAGE_SIZE,
    DEFAULT_THUMBNAILS_DIR, DEFAULT_THUMBNAIL_URL_PREFIX, DEFAULT_UPLOAD_THUMBNAIL_QUALITY,
    ORIGINALS_URL_PREFIX,
};

const SERVER_PORT: u16 = 8080;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Base server configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    /// `compact` (default) or `json`
    pub log_format: String,
}

/// How `GET /files` renders the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingMode {
    /// Paginated `{name, mod_time, thumbnail}` entries with thumbnail backfill.
    #[default]
    Detailed,
    /// Every stored name, unpaginated.
    Names,
}

impl FromStr for ListingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "detailed" => Ok(ListingMode::Detailed),
            "names" => Ok(ListingMode::Names),
            _ => Err(anyhow::anyhow!("Invalid listing mode: {}", s)),
        }
    }
}

impl Display for ListingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ListingMode::Detailed => write!(f, "detailed"),
            ListingMode::Names => write!(f, "names"),
        }
    }
}

/// Batch admission limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestLimits {
    pub max_files: usize,
    pub max_file_size_bytes: u64,
    /// Reject the whole batch (nothing persisted) when any file is refused.
    pub atomic_admission: bool,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * BYTES_PER_MB,
            atomic_admission: false,
        }
    }
}

/// Thumbnail sizing and encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThumbnailSettings {
    /// JPEG quality, 1..=100.
    pub quality: u8,
    /// Bounding box edge. `None` bounds the thumbnail by the image's own size.
    pub max_dimension: Option<u32>,
}

impl ThumbnailSettings {
    pub fn upload() -> Self {
        Self {
            quality: DEFAULT_UPLOAD_THUMBNAIL_QUALITY,
            max_dimension: None,
        }
    }

    pub fn backfill() -> Self {
        Self {
            quality: DEFAULT_BACKFILL_THUMBNAIL_QUALITY,
            max_dimension: None,
        }
    }
}

/// Gallery listing behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingSettings {
    pub page_size: usize,
    pub mode: ListingMode,
    pub thumbnail_url_prefix: String,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            mode: ListingMode::Detailed,
            thumbnail_url_prefix: DEFAULT_THUMBNAIL_URL_PREFIX.to_string(),
        }
    }
}

/// Gallery service configuration
#[derive(Clone, Debug)]
pub struct GalleryConfig {
    pub base: BaseConfig,
    pub originals_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub max_files: usize,
    pub max_file_size_bytes: u64,
    pub atomic_admission: bool,
    pub page_size: usize,
    pub listing_mode: ListingMode,
    pub upload_thumbnail_quality: u8,
    pub backfill_thumbnail_quality: u8,
    pub thumbnail_max_dimension: Option<u32>,
    pub thumbnail_url_prefix: String,
}

impl GalleryConfig {
    /// Defaults rooted at the given directories. Used by tests and embedders
    /// that do not read the environment.
    pub fn with_dirs(originals_dir: impl Into<PathBuf>, thumbnails_dir: impl Into<PathBuf>) -> Self {
        let limits = IngestLimits::default();
        let listing = ListingSettings::default();
        Self {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                log_format: "compact".to_string(),
            },
            originals_dir: originals_dir.into(),
            thumbnails_dir: thumbnails_dir.into(),
            max_files: limits.max_files,
            max_file_size_bytes: limits.max_file_size_bytes,
            atomic_admission: limits.atomic_admission,
            page_size: listing.page_size,
            listing_mode: listing.mode,
            upload_thumbnail_quality: DEFAULT_UPLOAD_THUMBNAIL_QUALITY,
            backfill_thumbnail_quality: DEFAULT_BACKFILL_THUMBNAIL_QUALITY,
            thumbnail_max_dimension: None,
            thumbnail_url_prefix: listing.thumbnail_url_prefix,
        }
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "compact".to_string())
                .to_lowercase(),
        };

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("MAX_FILE_SIZE_MB must be a positive integer"))?;

        let listing_mode = match env::var("LISTING_MODE") {
            Ok(raw) => raw.parse::<ListingMode>()?,
            Err(_) => ListingMode::default(),
        };

        let thumbnail_max_dimension = match env::var("THUMBNAIL_MAX_DIMENSION") {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u32>().map_err(|_| {
                anyhow::anyhow!("THUMBNAIL_MAX_DIMENSION must be a positive integer")
            })?),
            _ => None,
        };

        Ok(GalleryConfig {
            base,
            originals_dir: env::var("ORIGINALS_DIR")
                .unwrap_or_else(|_| DEFAULT_ORIGINALS_DIR.to_string())
                .into(),
            thumbnails_dir: env::var("THUMBNAILS_DIR")
                .unwrap_or_else(|_| DEFAULT_THUMBNAILS_DIR.to_string())
                .into(),
            max_files: env::var("MAX_FILES")
                .unwrap_or_else(|_| DEFAULT_MAX_FILES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_FILES must be a positive integer"))?,
            max_file_size_bytes: max_file_size_mb.saturating_mul(BYTES_PER_MB),
            atomic_admission: env::var("ATOMIC_ADMISSION")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            page_size: env::var("PAGE_SIZE")
                .unwrap_or_else(|_| DEFAULT_PAGE_SIZE.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PAGE_SIZE must be a positive integer"))?,
            listing_mode,
            upload_thumbnail_quality: env::var("UPLOAD_THUMBNAIL_QUALITY")
                .unwrap_or_else(|_| DEFAULT_UPLOAD_THUMBNAIL_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPLOAD_THUMBNAIL_QUALITY must be 1-100"))?,
            backfill_thumbnail_quality: env::var("BACKFILL_THUMBNAIL_QUALITY")
                .unwrap_or_else(|_| DEFAULT_BACKFILL_THUMBNAIL_QUALITY.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("BACKFILL_THUMBNAIL_QUALITY must be 1-100"))?,
            thumbnail_max_dimension,
            thumbnail_url_prefix: env::var("THUMBNAIL_URL_PREFIX")
                .unwrap_or_else(|_| DEFAULT_THUMBNAIL_URL_PREFIX.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES must be at least 1"));
        }
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be at least 1"));
        }
        if self.page_size == 0 {
            return Err(anyhow::anyhow!("PAGE_SIZE must be at least 1"));
        }
        for (key, quality) in [
            ("UPLOAD_THUMBNAIL_QUALITY", self.upload_thumbnail_quality),
            ("BACKFILL_THUMBNAIL_QUALITY", self.backfill_thumbnail_quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(anyhow::anyhow!("{} must be between 1 and 100", key));
            }
        }
        if self.thumbnail_max_dimension == Some(0) {
            return Err(anyhow::anyhow!("THUMBNAIL_MAX_DIMENSION must be at least 1"));
        }
        if !self.thumbnail_url_prefix.starts_with('/') {
            return Err(anyhow::anyhow!("THUMBNAIL_URL_PREFIX must start with '/'"));
        }
        let route = self.thumbnail_url_prefix.trim_end_matches('/');
        if route.is_empty() || route == ORIGINALS_URL_PREFIX {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_URL_PREFIX cannot be '/' or '{}'",
                ORIGINALS_URL_PREFIX
            ));
        }
        if self.originals_dir == self.thumbnails_dir {
            return Err(anyhow::anyhow!(
                "ORIGINALS_DIR and THUMBNAILS_DIR must be different directories"
            ));
        }
        Ok(())
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<GalleryConfig>);

impl Config {
    fn as_gallery(&self) -> &GalleryConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = GalleryConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_gallery().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_gallery().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.as_gallery().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_gallery().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_gallery().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_gallery().base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.as_gallery().base.log_format
    }

    pub fn originals_dir(&self) -> &PathBuf {
        &self.as_gallery().originals_dir
    }

    pub fn thumbnails_dir(&self) -> &PathBuf {
        &self.as_gallery().thumbnails_dir
    }

    pub fn max_files(&self) -> usize {
        self.as_gallery().max_files
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.as_gallery().max_file_size_bytes
    }

    pub fn listing_mode(&self) -> ListingMode {
        self.as_gallery().listing_mode
    }

    pub fn ingest_limits(&self) -> IngestLimits {
        let gallery = self.as_gallery();
        IngestLimits {
            max_files: gallery.max_files,
            max_file_size_bytes: gallery.max_file_size_bytes,
            atomic_admission: gallery.atomic_admission,
        }
    }

    pub fn upload_thumbnails(&self) -> ThumbnailSettings {
        let gallery = self.as_gallery();
        ThumbnailSettings {
            quality: gallery.upload_thumbnail_quality,
            max_dimension: gallery.thumbnail_max_dimension,
        }
    }

    pub fn backfill_thumbnails(&self) -> ThumbnailSettings {
        let gallery = self.as_gallery();
        ThumbnailSettings {
            quality: gallery.backfill_thumbnail_quality,
            max_dimension: gallery.thumbnail_max_dimension,
        }
    }

    /// Path the thumbnails directory is served under.
    pub fn thumbnail_route(&self) -> &str {
        self.as_gallery().thumbnail_url_prefix.trim_end_matches('/')
    }

    pub fn listing(&self) -> ListingSettings {
        let gallery = self.as_gallery();
        ListingSettings {
            page_size: gallery.page_size,
            mode: gallery.listing_mode,
            thumbnail_url_prefix: gallery.thumbnail_url_prefix.clone(),
        }
    }

    /// Upper bound on an upload request body: every admissible file at its
    /// maximum size, plus one more so oversized files still reach admission.
    pub fn max_upload_body_bytes(&self) -> usize {
        let gallery = self.as_gallery();
        let total = gallery
            .max_file_size_bytes
            .saturating_mul(gallery.max_files as u64 + 1);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}

impl From<GalleryConfig> for Config {
    fn from(config: GalleryConfig) -> Self {
        Config(Box::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_mode_from_str() {
        assert_eq!("detailed".parse::<ListingMode>().unwrap(), ListingMode::Detailed);
        assert_eq!(" Names ".parse::<ListingMode>().unwrap(), ListingMode::Names);
        assert!("paged".parse::<ListingMode>().is_err());
    }

    #[test]
    fn test_gallery_defaults() {
        let config = Config::from(GalleryConfig::with_dirs("uploads", "thumbnails"));
        assert!(config.validate().is_ok());

        let limits = config.ingest_limits();
        assert_eq!(limits.max_files, 20);
        assert_eq!(limits.max_file_size_bytes, 1 << 30);
        assert!(!limits.atomic_admission);

        assert_eq!(config.upload_thumbnails().quality, 95);
        assert_eq!(config.backfill_thumbnails().quality, 20);
        assert_eq!(config.listing().page_size, 9);
        assert_eq!(config.listing().thumbnail_url_prefix, "/thumbnails");
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut gallery = GalleryConfig::with_dirs("uploads", "thumbnails");
        gallery.page_size = 0;
        assert!(gallery.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_quality() {
        let mut gallery = GalleryConfig::with_dirs("uploads", "thumbnails");
        gallery.backfill_thumbnail_quality = 0;
        assert!(gallery.validate().is_err());

        gallery.backfill_thumbnail_quality = 101;
        assert!(gallery.validate().is_err());
    }

    #[test]
    fn test_thumbnail_route_follows_prefix() {
        let mut gallery = GalleryConfig::with_dirs("uploads", "thumbnails");
        gallery.thumbnail_url_prefix = "/thumbs/".to_string();
        assert!(gallery.validate().is_ok());
        assert_eq!(Config::from(gallery).thumbnail_route(), "/thumbs");
    }

    #[test]
    fn test_validate_rejects_unmountable_thumbnail_prefix() {
        for prefix in ["/", "/uploads", "thumbs"] {
            let mut gallery = GalleryConfig::with_dirs("uploads", "thumbnails");
            gallery.thumbnail_url_prefix = prefix.to_string();
            assert!(gallery.validate().is_err(), "prefix {:?}", prefix);
        }
    }

    #[test]
    fn test_validate_rejects_shared_directory() {
        let gallery = GalleryConfig::with_dirs("media", "media");
        assert!(gallery.validate().is_err());
    }

    #[test]
    fn test_max_upload_body_bytes_saturates() {
        let mut gallery = GalleryConfig::with_dirs("uploads", "thumbnails");
        gallery.max_file_size_bytes = u64::MAX;
        let config = Config::from(gallery);
        assert_eq!(config.max_upload_body_bytes(), usize::MAX);
    }
}
