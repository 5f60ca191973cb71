use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use cinetheque_core::models::{CategoryChanges, NewCategory};
use cinetheque_core::{AppError, PageEnvelope, PageQuery};
use cinetheque_db::{CatalogTransaction, Repositories};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{not_found, parse_id, SearchQuery};
use crate::constants::{MISSING_QUERY_MESSAGE, UNPROCESSABLE_MESSAGE};
use crate::error::{HttpAppError, ValidatedJson};
use crate::resources::{collection, CategoryResource};
use crate::response::{rollback, send_paginated, send_response, throw_error, ApiResponse};
use crate::state::AppState;

const NOT_FOUND: &str = "Category not found";
const NAME_TAKEN: &str = "The name has already been taken.";

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CategoryInput {
    #[schema(example = "Science Fiction")]
    pub name: Option<String>,
}

impl CategoryInput {
    fn into_new_category(self) -> Result<NewCategory, AppError> {
        let name = self
            .name
            .ok_or_else(|| AppError::Validation("The name field is required.".to_string()))?;
        let category = NewCategory {
            name: name.trim().to_string(),
        };
        category.validate()?;
        Ok(category)
    }

    fn into_changes(self) -> Result<CategoryChanges, AppError> {
        let changes = CategoryChanges {
            name: self.name.map(|n| n.trim().to_string()),
        };
        changes.validate()?;
        Ok(changes)
    }
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of categories", body = ApiResponse<PageEnvelope<CategoryResource>>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, HttpAppError> {
    let page = state
        .catalog
        .categories()
        .index(state.page_request(&query))
        .await?;

    let message = page.is_empty().then_some("No categories found");
    Ok(send_paginated(
        page.map(CategoryResource::from),
        message,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/categories/search",
    tag = "Categories",
    params(SearchQuery),
    responses(
        (status = 200, description = "Categories whose name match", body = ApiResponse<Vec<CategoryResource>>),
        (status = 404, description = "No categories found"),
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

    let categories = state.catalog.categories().search(term).await?;
    if categories.is_empty() {
        return Ok(send_response(
            Some(Vec::<CategoryResource>::new()),
            Some("No categories found"),
            StatusCode::NOT_FOUND,
        ));
    }

    Ok(send_response(
        Some(collection::<_, CategoryResource>(categories)),
        None,
        StatusCode::OK,
    ))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<CategoryResource>),
        (status = 404, description = "Category not found")
    )
)]
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    match state.catalog.categories().get_by_id(id).await? {
        Some(category) => Ok(send_response(
            Some(CategoryResource::from(category)),
            None,
            StatusCode::OK,
        )),
        None => Ok(not_found(NOT_FOUND)),
    }
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResource>),
        (status = 422, description = "Invalid input data"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "store_category"))]
pub async fn store(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> Result<Response, HttpAppError> {
    let new_category = input.into_new_category()?;

    let tx = state.catalog.begin().await?;

    let result = async {
        ensure_name_available(tx.as_ref(), &new_category.name, None).await?;
        tx.categories().store(new_category).await
    }
    .await;

    let category = match result {
        Ok(category) => category,
        Err(e) => return Err(rollback(tx, e, None).await),
    };

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response(
        Some(CategoryResource::from(category)),
        Some("Category created successfully"),
        StatusCode::CREATED,
    ))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResource>),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Invalid input data or nothing to update"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "update_category"))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<CategoryInput>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };
    let changes = input.into_changes()?;

    let tx = state.catalog.begin().await?;

    let result = async {
        if tx.categories().get_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }
        if let Some(name) = changes.name.as_deref() {
            ensure_name_available(tx.as_ref(), name, Some(id)).await?;
        }
        tx.categories()
            .update(changes, id)
            .await?
            .ok_or_else(|| AppError::Unprocessable(UNPROCESSABLE_MESSAGE.to_string()))
    }
    .await;

    let category = match result {
        Ok(category) => category,
        Err(e) => return Err(rollback(tx, e, None).await),
    };

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response(
        Some(CategoryResource::from(category)),
        Some("Category updated successfully"),
        StatusCode::OK,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = String, Path, description = "Category ID (UUID)")),
    responses(
        (status = 204, description = "Category deleted successfully"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Error deleting category")
    )
)]
#[tracing::instrument(skip(state), fields(operation = "destroy_category"))]
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, HttpAppError> {
    let Some(id) = parse_id(&id) else {
        return Ok(not_found(NOT_FOUND));
    };

    let tx = state.catalog.begin().await?;

    match tx.categories().get_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Err(rollback(tx, AppError::NotFound(NOT_FOUND.to_string()), None).await),
        Err(e) => return Err(rollback(tx, e, None).await),
    }

    match tx.categories().delete(id).await {
        Ok(true) => {}
        Ok(false) => {
            let error = AppError::Internal(format!("Delete of category {} affected no rows", id));
            return Err(rollback(tx, error, Some("Error deleting category")).await);
        }
        Err(e) => return Err(rollback(tx, e, Some("Error deleting category")).await),
    }

    tx.commit().await.map_err(|e| throw_error(e, None))?;

    Ok(send_response::<()>(
        None,
        Some("Category deleted successfully"),
        StatusCode::NO_CONTENT,
    ))
}

/// Category names are unique; `except` is the category being renamed.
async fn ensure_name_available(
    tx: &dyn CatalogTransaction,
    name: &str,
    except: Option<Uuid>,
) -> Result<(), AppError> {
    match tx.categories().find_by_name(name).await? {
        Some(existing) if Some(existing.id) != except => {
            Err(AppError::Validation(NAME_TAKEN.to_string()))
        }
        _ => Ok(()),
    }
}
