//! Gallery listing handler

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use photobox_core::{ListingMode, NamesPage, Page};
use utoipa::IntoParams;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Default, PartialEq, Eq, IntoParams)]
pub struct FilesQuery {
    /// 1-based page number. Missing or unparsable values return the first page.
    page: Option<String>,
}

impl FilesQuery {
    /// The first `page` value wins when the parameter is repeated.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let page = pairs
            .into_iter()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value);
        Self { page }
    }
}

/// List stored images, most recently modified first
#[utoipa::path(
    get,
    path = "/files",
    tag = "gallery",
    params(FilesQuery),
    responses(
        (status = 200, description = "One page of gallery entries, or all names in names mode", body = Page),
        (status = 500, description = "Originals directory unreadable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response, HttpAppError> {
    let query = query
        .map(|Query(pairs)| FilesQuery::from_pairs(pairs))
        .unwrap_or_default();

    let response = match state.lister.settings().mode {
        ListingMode::Detailed => {
            let page: Page = state.lister.list(query.page.as_deref()).await?;
            Json(page).into_response()
        }
        ListingMode::Names => {
            let names: NamesPage = state.lister.list_names().await?;
            Json(names).into_response()
        }
    };

    Ok(response)
}
