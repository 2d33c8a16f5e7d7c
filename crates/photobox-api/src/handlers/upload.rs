//! Batch upload handler

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::spool_multipart;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Files uploaded successfully";

/// Upload a batch of images
///
/// Files are taken from the repeated multipart field `files` and processed in
/// order. Processing stops at the first failure; files stored before it are
/// kept.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "gallery",
    request_body(content_type = "multipart/form-data", description = "Repeated `files` field"),
    responses(
        (status = 200, description = "All files stored", body = String, content_type = "text/plain"),
        (status = 400, description = "Too many files, file too large, invalid file name or malformed multipart", body = ErrorResponse),
        (status = 500, description = "File could not be stored or decoded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let batch = spool_multipart(multipart?, state.config.ingest_limits()).await?;
    let count = batch.files.len();

    let report = state.pipeline.ingest(batch.files).await;
    let stored = report.into_result()?;

    tracing::info!(count, stored = stored.len(), "Upload batch completed");
    Ok((StatusCode::OK, UPLOAD_SUCCESS_MESSAGE))
}
