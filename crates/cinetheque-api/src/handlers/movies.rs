use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use cinetheque_core::models::{MediaType, MediaUpsert, Movie, MovieChanges, NewMovie};
use cinetheque_core::{AppError, PageEnvelope, PageQuery};
use cinetheque_db::{CatalogTransaction, Repositories};
use std::sync::Arc;

use super::{not_found, parse_id, SearchQuery};
use crate::constants::{MISSING_QUERY_MESSAGE, UNPROCESSABLE_MESSAGE};
use crate::error::HttpAppError;
use crate::extract::{MovieInput, MoviePayload};
use crate::resources::{collection, MovieResource};
use crate::response::{rollback, send_paginated, send_response, throw_error, ApiResponse};
use crate::services::StoredFile;
use crate::state::AppState;

const NOT_FOUND: &str = "Movie not found";

#[utoipa::path(
    get,
    path = "/api/movies",
    tag = "Movies",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of movies", body = ApiResponse<PageEnvelope<MovieResource>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpAppError> {
    let page = state
        .catalog
        .movies()
        .index(state.page_request(&query))
        .await?;

    let message = page.is_empty().then_some("No movies found");
    Ok(send_paginated(
        page.map(MovieResource::from),
        message,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/movies/search",
    tag = "Movies",
    params(SearchQuery),
    responses(
        (status = 200, description = "Movies whose name or description match", body = ApiResponse<Vec<MovieResource>>),
        (status = 404, description = "No movies found"),
        (status = 422, description = "Missing query parameter")
    )
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, HttpAppError> {
    let Some(term) = query.term() else {
        return Ok(send_response::<()>(
            None,
            Some(MISSING_QUERY_MESSAGE),
            StatusCode::UNPROCESSABLE_ENTITY,
        ));
    };

    let movies = state.catalog.movies().search(term).await?;
    if movies.is_empty() {
        return Ok(send_response(
            Some(Vec::<MovieResource>::new()),
            Some("No movies found"),
            StatusCode::NOT_FOUND,
        ));
    }

    Ok(send_response(
        Some(collection::<_, MovieResource>(movies)),
        None,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ID (UUID)")),
    responses(
        (status = 200, description = "Movie with its poster", body = ApiResponse<MovieResource>),
        (status = 404, description = "Movie not found")
    )
)]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    match state.catalog.movies().get_by_id(id).await? {
        Some(movie) => Ok(send_response(
            Some(MovieResource::from(movie)),
            None,
            StatusCode::OK,
        )),
        None => Ok(not_found(NOT_FOUND)),
    }
}

/// Accepts JSON or `multipart/form-data`; the optional `media` file becomes the poster.
#[utoipa::path(
    post,
    path = "/api/movies",
    tag = "Movies",
    request_body = MovieInput,
    responses(
        (status = 201, description = "Movie created successfully", body = ApiResponse<MovieResource>),
        (status = 422, description = "Invalid input data"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "store_movie"))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    payload: MoviePayload,
) -> Result<Response, HttpAppError> {
    let MoviePayload { input, media } = payload;
    let new_movie = input.into_new_movie(None)?;

    let tx = state.catalog.begin().await?;

    let poster = match state.uploader.upload(media, MediaType::Poster, None).await {
        Ok(poster) => poster,
        Err(e) => {
            tracing::warn!(error = %e, "Poster upload failed, storing movie without media");
            None
        }
    };

    let movie = match insert_movie(tx.as_ref(), new_movie, poster.as_ref()).await {
        Ok(movie) => movie,
        Err(e) => {
            discard_poster(&state, poster.as_ref()).await;
            return Err(rollback(tx, e, None).await);
        }
    };

    if let Err(e) = tx.commit().await {
        discard_poster(&state, poster.as_ref()).await;
        return Err(throw_error(e, None));
    }

    tracing::info!(movie_id = %movie.id, media_id = ?movie.media_id, "Movie created");
    Ok(send_response(
        Some(MovieResource::from(movie)),
        Some("Movie created successfully"),
        StatusCode::CREATED,
    ))
}

#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ID (UUID)")),
    request_body = MovieInput,
    responses(
        (status = 200, description = "Movie updated successfully", body = ApiResponse<MovieResource>),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Invalid input data or nothing to update"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "update_movie"))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: MoviePayload,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };
    let MoviePayload { input, media } = payload;
    let mut changes = input.into_changes()?;

    let tx = state.catalog.begin().await?;

    let movie = match tx.movies().get_by_id(id).await {
        Ok(Some(movie)) => movie,
        Ok(None) => return Err(rollback(tx, AppError::NotFound(NOT_FOUND.to_string()), None).await),
        Err(e) => return Err(rollback(tx, e, None).await),
    };

    let current_path = movie.media.as_ref().and_then(|m| m.media_path.as_deref());
    let poster = match state
        .uploader
        .upload(media, MediaType::Poster, current_path)
        .await
    {
        Ok(poster) => poster,
        Err(e) => {
            tracing::warn!(error = %e, movie_id = %id, "Poster upload failed, clearing movie media");
            changes.media_id = Some(None);
            None
        }
    };

    let updated = match apply_update(tx.as_ref(), &movie, changes, poster.as_ref()).await {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            discard_poster(&state, poster.as_ref()).await;
            return Err(rollback(
                tx,
                AppError::Unprocessable(UNPROCESSABLE_MESSAGE.to_string()),
                None,
            )
            .await);
        }
        Err(e) => {
            discard_poster(&state, poster.as_ref()).await;
            return Err(rollback(tx, e, None).await);
        }
    };

    if let Err(e) = tx.commit().await {
        discard_poster(&state, poster.as_ref()).await;
        return Err(throw_error(e, None));
    }

    Ok(send_response(
        Some(MovieResource::from(updated)),
        Some("Movie updated successfully"),
        StatusCode::OK,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    tag = "Movies",
    params(("id" = String, Path, description = "Movie ID (UUID)")),
    responses(
        (status = 204, description = "Movie deleted successfully"),
        (status = 404, description = "Movie not found"),
        (status = 500, description = "Error deleting movie")
    )
)]
#[tracing::instrument(skip(state), fields(operation = "destroy_movie"))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    let tx = state.catalog.begin().await?;

    match tx.movies().get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(rollback(tx, AppError::NotFound(NOT_FOUND.to_string()), None).await),
        Err(e) => return Err(rollback(tx, e, None).await),
    }

    match tx.movies().delete(id).await {
        Ok(true) => {}
        Ok(false) => {
            let error = AppError::Internal(format!("Delete of movie {} affected no rows", id));
            return Err(rollback(tx, error, Some("Error deleting movie")).await);
        }
        Err(e) => return Err(rollback(tx, e, Some("Error deleting movie")).await),
    }

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response::<()>(
        None,
        Some("Movie deleted successfully"),
        StatusCode::NO_CONTENT,
    ))
}

/// Insert the poster's media row (if any) and the movie referencing it.
async fn insert_movie(
    tx: &dyn CatalogTransaction,
    mut movie: NewMovie,
    poster: Option<&StoredFile>,
) -> Result<Movie, AppError> {
    if let Some(file) = poster {
        let media = tx.medias().store(poster_upsert(file)).await?;
        movie.media_id = Some(media.id);
    }
    tx.movies().store(movie).await
}

/// Upsert the poster into the movie's existing media row so `media_id` stays stable.
async fn apply_update(
    tx: &dyn CatalogTransaction,
    movie: &Movie,
    mut changes: MovieChanges,
    poster: Option<&StoredFile>,
) -> Result<Option<Movie>, AppError> {
    if let Some(file) = poster {
        let media = tx
            .medias()
            .store_or_update(poster_upsert(file), movie.media_id)
            .await?;
        changes.media_id = Some(Some(media.id));
    }
    tx.movies().update(changes, movie.id).await
}

fn poster_upsert(file: &StoredFile) -> MediaUpsert {
    MediaUpsert {
        media_path: Some(file.path.clone()),
        media_url: Some(file.url.clone()),
        media_type: MediaType::Poster,
    }
}

async fn discard_poster(state: &AppState, poster: Option<&StoredFile>) {
    if let Some(file) = poster {
        state.uploader.discard(&file.path).await;
    }
}
