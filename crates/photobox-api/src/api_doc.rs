//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use photobox_core::models;

/// Returns the OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Photobox API",
        version = "0.1.0",
        description = "Photo gallery: batch image upload with orientation-corrected thumbnails, paginated listing and downloads."
    ),
    paths(
        handlers::upload::upload_files,
        handlers::files::list_files,
        handlers::download::download_file,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        models::GalleryEntry,
        models::Page,
        models::NamesPage,
        handlers::health::HealthResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "gallery", description = "Upload, list and download images"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_gallery_paths() {
        let spec = get_openapi_spec();
        for path in ["/upload", "/files", "/download/{filename}", "/health", "/health/ready"] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
