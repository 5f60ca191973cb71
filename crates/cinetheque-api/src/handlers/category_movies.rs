use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use cinetheque_core::models::{CategoryMovieChanges, NewCategoryMovie};
use cinetheque_core::{AppError, PageEnvelope, PageQuery};
use cinetheque_db::{CatalogTransaction, Repositories};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{not_found, parse_id};
use crate::constants::UNPROCESSABLE_MESSAGE;
use crate::error::{HttpAppError, ValidatedJson};
use crate::resources::CategoryMovieResource;
use crate::response::{rollback, send_paginated, send_response, throw_error, ApiResponse};
use crate::state::AppState;

const NOT_FOUND: &str = "CategoryMovie not found";

/// Ids are taken as strings so a malformed one is reported like an unknown one.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CategoryMovieInput {
    #[schema(example = "3f1c2a9e-6a4b-4a83-9a49-8d7f3c1a2b10")]
    pub category_id: Option<String>,
    #[schema(example = "8d7f3c1a-2b10-4a83-9a49-3f1c2a9e6a4b")]
    pub movie_id: Option<String>,
}

fn invalid(field: &str) -> AppError {
    AppError::Unprocessable(format!("The selected {} is invalid.", field))
}

fn duplicate_link() -> AppError {
    AppError::Validation("The movie already belongs to this category.".to_string())
}

fn parse_field(field: &str, value: Option<&str>) -> Result<Option<Uuid>, AppError> {
    value
        .map(|raw| parse_id(raw).ok_or_else(|| invalid(field)))
        .transpose()
}

impl CategoryMovieInput {
    fn into_new_link(self) -> Result<NewCategoryMovie, AppError> {
        let category_id = parse_field("category_id", self.category_id.as_deref())?;
        let movie_id = parse_field("movie_id", self.movie_id.as_deref())?;

        match (category_id, movie_id) {
            (Some(category_id), Some(movie_id)) => Ok(NewCategoryMovie {
                category_id,
                movie_id,
            }),
            (category_id, movie_id) => {
                let mut missing = Vec::new();
                if category_id.is_none() {
                    missing.push("The category_id field is required.");
                }
                if movie_id.is_none() {
                    missing.push("The movie_id field is required.");
                }
                Err(AppError::Validation(missing.join(" ")))
            }
        }
    }

    fn into_changes(self) -> Result<CategoryMovieChanges, AppError> {
        Ok(CategoryMovieChanges {
            category_id: parse_field("category_id", self.category_id.as_deref())?,
            movie_id: parse_field("movie_id", self.movie_id.as_deref())?,
        })
    }
}

/// Both ends of a link must exist; unknown ids are a 422 like any other invalid field.
async fn ensure_references_exist(
    tx: &dyn CatalogTransaction,
    category_id: Option<Uuid>,
    movie_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(id) = category_id {
        if tx.categories().get_by_id(id).await?.is_none() {
            return Err(invalid("category_id"));
        }
    }
    if let Some(id) = movie_id {
        if tx.movies().get_by_id(id).await?.is_none() {
            return Err(invalid("movie_id"));
        }
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/category-movies",
    tag = "CategoryMovies",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of category/movie links", body = ApiResponse<PageEnvelope<CategoryMovieResource>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpAppError> {
    let page = state
        .catalog
        .category_movies()
        .index(state.page_request(&query))
        .await?;

    let message = page.is_empty().then_some("No categoriesMovies found");
    Ok(send_paginated(
        page.map(CategoryMovieResource::from),
        message,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/category-movies/{id}",
    tag = "CategoryMovies",
    params(("id" = String, Path, description = "CategoryMovie ID (UUID)")),
    responses(
        (status = 200, description = "Category/movie link", body = ApiResponse<CategoryMovieResource>),
        (status = 404, description = "CategoryMovie not found")
    )
)]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    match state.catalog.category_movies().get_by_id(id).await? {
        Some(link) => Ok(send_response(
            Some(CategoryMovieResource::from(link)),
            None,
            StatusCode::OK,
        )),
        None => Ok(not_found(NOT_FOUND)),
    }
}

#[utoipa::path(
    post,
    path = "/api/category-movies",
    tag = "CategoryMovies",
    request_body = CategoryMovieInput,
    responses(
        (status = 201, description = "CategoryMovie created successfully", body = ApiResponse<CategoryMovieResource>),
        (status = 422, description = "Missing or unknown category_id / movie_id"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "store_category_movie"))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<CategoryMovieInput>,
) -> Result<Response, HttpAppError> {
    let new_link = input.into_new_link()?;

    let tx = state.catalog.begin().await?;

    let result = async {
        ensure_references_exist(tx.as_ref(), Some(new_link.category_id), Some(new_link.movie_id))
            .await?;
        if tx
            .category_movies()
            .exists(new_link.category_id, new_link.movie_id)
            .await?
        {
            return Err(duplicate_link());
        }
        tx.category_movies().store(new_link).await
    }
    .await;

    let link = match result {
        Ok(link) => link,
        Err(e) => return Err(rollback(tx, e, None).await),
    };

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response(
        Some(CategoryMovieResource::from(link)),
        Some("CategoryMovie created successfully"),
        StatusCode::CREATED,
    ))
}

#[utoipa::path(
    put,
    path = "/api/category-movies/{id}",
    tag = "CategoryMovies",
    params(("id" = String, Path, description = "CategoryMovie ID (UUID)")),
    request_body = CategoryMovieInput,
    responses(
        (status = 200, description = "CategoryMovie updated successfully", body = ApiResponse<CategoryMovieResource>),
        (status = 404, description = "CategoryMovie not found"),
        (status = 422, description = "Unknown category_id / movie_id, duplicate link or nothing to update"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "update_category_movie"))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CategoryMovieInput>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };
    let changes = input.into_changes()?;

    let tx = state.catalog.begin().await?;

    let result = async {
        let Some(current) = tx.category_movies().get_by_id(id).await? else {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        };
        ensure_references_exist(tx.as_ref(), changes.category_id, changes.movie_id).await?;

        let category_id = changes.category_id.unwrap_or(current.category_id);
        let movie_id = changes.movie_id.unwrap_or(current.movie_id);
        let moved = (category_id, movie_id) != (current.category_id, current.movie_id);
        if moved && tx.category_movies().exists(category_id, movie_id).await? {
            return Err(duplicate_link());
        }
        tx.category_movies()
            .update(changes, id)
            .await?
            .ok_or_else(|| AppError::Unprocessable(UNPROCESSABLE_MESSAGE.to_string()))
    }
    .await;

    let link = match result {
        Ok(link) => link,
        Err(e) => return Err(rollback(tx, e, None).await),
    };

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response(
        Some(CategoryMovieResource::from(link)),
        Some("CategoryMovie updated successfully"),
        StatusCode::OK,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/category-movies/{id}",
    tag = "CategoryMovies",
    params(("id" = String, Path, description = "CategoryMovie ID (UUID)")),
    responses(
        (status = 204, description = "CategoryMovie deleted successfully"),
        (status = 404, description = "CategoryMovie not found"),
        (status = 500, description = "Error deleting categoryMovie")
    )
)]
#[tracing::instrument(skip(state), fields(operation = "destroy_category_movie"))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    let tx = state.catalog.begin().await?;

    match tx.category_movies().get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(rollback(tx, AppError::NotFound(NOT_FOUND.to_string()), None).await),
        Err(e) => return Err(rollback(tx, e, None).await),
    }

    match tx.category_movies().delete(id).await {
        Ok(true) => {}
        Ok(false) => {
            let error = AppError::Internal(format!("Delete of category movie {} affected no rows", id));
            return Err(rollback(tx, error, Some("Error deleting categoryMovie")).await);
        }
        Err(e) => return Err(rollback(tx, e, Some("Error deleting categoryMovie")).await),
    }

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response::<()>(
        None,
        Some("CategoryMovie deleted successfully"),
        StatusCode::NO_CONTENT,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_reports_missing_ids() {
        let err = CategoryMovieInput::default().into_new_link().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: The category_id field is required. The movie_id field is required."
        );
    }

    #[test]
    fn malformed_id_is_an_invalid_selection() {
        let input = CategoryMovieInput {
            category_id: Some("not-a-uuid".to_string()),
            movie_id: Some(Uuid::new_v4().to_string()),
        };
        assert!(matches!(
            input.into_new_link(),
            Err(AppError::Unprocessable(msg)) if msg == "The selected category_id is invalid."
        ));
    }

    #[test]
    fn changes_parse_only_supplied_ids() {
        let movie_id = Uuid::new_v4();
        let input = CategoryMovieInput {
            category_id: None,
            movie_id: Some(movie_id.to_string()),
        };
        let changes = input.into_changes().unwrap();
        assert_eq!(changes.category_id, None);
        assert_eq!(changes.movie_id, Some(movie_id));
    }
}
