use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use cinetheque_core::{AppError, PageEnvelope, PageQuery};
use cinetheque_db::Repositories;
use std::sync::Arc;

use super::{not_found, parse_id};
use crate::error::HttpAppError;
use crate::resources::MediaResource;
use crate::response::{rollback, send_paginated, send_response, throw_error, ApiResponse};
use crate::state::AppState;

const NOT_FOUND: &str = "Media not found";

#[utoipa::path(
    get,
    path = "/api/medias",
    tag = "Medias",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of media records", body = ApiResponse<PageEnvelope<MediaResource>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpAppError> {
    let page = state
        .catalog
        .medias()
        .index(state.page_request(&query))
        .await?;

    let message = page.is_empty().then_some("No medias found");
    Ok(send_paginated(
        page.map(MediaResource::from),
        message,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/medias/{id}",
    tag = "Medias",
    params(("id" = String, Path, description = "Media ID (UUID)")),
    responses(
        (status = 200, description = "Media record", body = ApiResponse<MediaResource>),
        (status = 404, description = "Media not found")
    )
)]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    match state.catalog.medias().get_by_id(id).await? {
        Some(media) => Ok(send_response(
            Some(MediaResource::from(media)),
            None,
            StatusCode::OK,
        )),
        None => Ok(not_found(NOT_FOUND)),
    }
}

/// Deletes the record, then its file on the public disk. Movies pointing at it lose their poster.
#[utoipa::path(
    delete,
    path = "/api/medias/{id}",
    tag = "Medias",
    params(("id" = String, Path, description = "Media ID (UUID)")),
    responses(
        (status = 204, description = "Media deleted successfully"),
        (status = 404, description = "Media not found"),
        (status = 500, description = "Error deleting media")
    )
)]
#[tracing::instrument(skip(state), fields(operation = "destroy_media"))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    let tx = state.catalog.begin().await?;

    let media = match tx.medias().get_by_id(id).await {
        Ok(Some(media)) => media,
        Ok(None) => return Err(rollback(tx, AppError::NotFound(NOT_FOUND.to_string()), None).await),
        Err(e) => return Err(rollback(tx, e, None).await),
    };

    match tx.medias().delete(id).await {
        Ok(true) => {}
        Ok(false) => {
            let error = AppError::Internal(format!("Delete of media {} affected no rows", id));
            return Err(rollback(tx, error, Some("Error deleting media")).await);
        }
        Err(e) => return Err(rollback(tx, e, Some("Error deleting media")).await),
    }

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    if let Some(path) = media.media_path.as_deref() {
        state.uploader.discard(path).await;
    }

    Ok(send_response::<()>(
        None,
        Some("Media deleted successfully"),
        StatusCode::NO_CONTENT,
    ))
}
