//! Response envelope
//!
//! Every endpoint answers `{ "success": bool, "data": ..., "message": "..." }`.
//! `success` follows the status class; an empty message falls back to the
//! standard reason phrase for the status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cinetheque_core::{AppError, ErrorMetadata, PageEnvelope, Paginated, GENERIC_FAILURE_MESSAGE};
use cinetheque_db::CatalogTransaction;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::HttpAppError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: Option<&str>) -> Self {
        let message = match message {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => default_message(status).to_string(),
        };
        Self {
            success: status.is_success(),
            data,
            message,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

/// Reason phrase used when a handler supplies no message
pub fn default_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "",
    }
}

pub fn send_response<T: Serialize>(
    data: Option<T>,
    message: Option<&str>,
    status: StatusCode,
) -> Response {
    (status, Json(ApiResponse::new(status, data, message))).into_response()
}

/// Same as [`send_response`] with `data` holding the page and its metadata
pub fn send_paginated<T: Serialize>(
    page: Paginated<T>,
    message: Option<&str>,
    status: StatusCode,
) -> Response {
    send_response(Some(PageEnvelope::from(page)), message, status)
}

/// Abort a write: log the failure, roll the transaction back and build the error response.
///
/// Unexpected failures answer 500 with `message` (or the generic failure text);
/// client errors raised inside the transaction keep their own status.
pub async fn rollback(
    tx: Box<dyn CatalogTransaction>,
    error: AppError,
    message: Option<&str>,
) -> HttpAppError {
    if error.is_sensitive() {
        tracing::error!(
            error = %error.detailed_message(),
            error_type = error.error_type(),
            "Rolling back transaction"
        );
    } else {
        tracing::debug!(error = %error, "Rolling back transaction");
    }

    if let Err(rollback_err) = tx.rollback().await {
        tracing::error!(
            error = %rollback_err,
            original_error = %error,
            "Failed to rollback transaction"
        );
    }

    throw_error(error, message)
}

/// Build the error response for a failure that happened outside a transaction.
pub fn throw_error(error: AppError, message: Option<&str>) -> HttpAppError {
    match message {
        Some(m) => HttpAppError::with_message(error, m),
        None if error.is_sensitive() => HttpAppError::with_message(error, GENERIC_FAILURE_MESSAGE),
        None => HttpAppError::new(error),
    }
}
