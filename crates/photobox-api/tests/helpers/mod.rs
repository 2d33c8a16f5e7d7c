//! Test helpers: build AppState and router for integration tests.
//!
//! Every test app owns a temporary directory holding both buckets.
//! Run with: `cargo test -p photobox-api`.

#![allow(dead_code)]

pub mod fixtures;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use photobox_api::setup::{routes, services, storage};
use photobox_core::{Config, GalleryConfig};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn originals_dir(&self) -> PathBuf {
        self._temp_dir.path().join("uploads")
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self._temp_dir.path().join("thumbnails")
    }

    pub fn original(&self, name: &str) -> PathBuf {
        self.originals_dir().join(name)
    }

    pub fn thumbnail(&self, name: &str) -> PathBuf {
        self.thumbnails_dir().join(name)
    }

    /// Place an original directly on disk, bypassing the upload route.
    pub fn seed_original(&self, name: &str, data: &[u8], mtime_secs: u64) {
        let path = self.original(name);
        std::fs::write(&path, data).expect("Failed to seed original");
        set_mtime(&path, mtime_secs);
    }
}

pub fn set_mtime(path: &Path, secs: u64) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file")
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .expect("Failed to set modification time");
}

/// Setup test app with default gallery settings.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

/// Setup test app, adjusting the gallery settings first.
pub async fn setup_test_app_with(configure: impl FnOnce(&mut GalleryConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let mut gallery = GalleryConfig::with_dirs(
        temp_dir.path().join("uploads"),
        temp_dir.path().join("thumbnails"),
    );
    configure(&mut gallery);
    let config = Config::from(gallery);

    let storage = storage::setup_storage(&config)
        .await
        .expect("Failed to create local storage");
    let state = services::initialize_services(&config, storage);
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");

    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        _temp_dir: temp_dir,
    }
}

/// Multipart form with one `files` part per (name, bytes) pair, in order.
pub fn files_form(files: Vec<(&str, Vec<u8>)>) -> MultipartForm {
    files
        .into_iter()
        .fold(MultipartForm::new(), |form, (name, data)| {
            let part = Part::bytes(bytes::Bytes::from(data))
                .file_name(name.to_string())
                .mime_type("application/octet-stream");
            form.add_part("files", part)
        })
}
