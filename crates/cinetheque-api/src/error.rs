//! HTTP error response conversion
//!
//! Handlers return `Result<Response, HttpAppError>`. Any `AppError` (or a type that
//! converts into one) renders as the standard envelope with `success: false`,
//! `data: null` and a client-safe message.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cinetheque_core::{AppError, ErrorMetadata, LogLevel};
use cinetheque_storage::StorageError;
use serde::de::DeserializeOwned;

use crate::response::ApiResponse;

/// Wrapper type for AppError to implement IntoResponse.
///
/// `message` replaces the error's own client message in the response body.
#[derive(Debug)]
pub struct HttpAppError {
    error: AppError,
    message: Option<String>,
}

impl HttpAppError {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            message: None,
        }
    }

    pub fn with_message(error: AppError, message: impl Into<String>) -> Self {
        Self {
            error,
            message: Some(message.into()),
        }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Message rendered in the envelope
    pub fn message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.error.client_message())
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError::new(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError::new(storage_error_to_app_error(err))
    }
}

pub fn storage_error_to_app_error(err: StorageError) -> AppError {
    match err {
        StorageError::NotFound(msg) => AppError::NotFound(msg),
        StorageError::InvalidKey(msg) => AppError::BadRequest(msg),
        StorageError::UploadFailed(msg) | StorageError::DeleteFailed(msg) => AppError::Storage(msg),
        StorageError::IoError(err) => AppError::Storage(format!("IO error: {}", err)),
        StorageError::ConfigError(msg) => AppError::Internal(msg),
    }
}

/// Body that parsed as JSON but did not fit the payload type is a validation
/// failure; anything else about the body is a bad request.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let body_text = rejection.body_text();
        let error = match rejection {
            JsonRejection::JsonDataError(_) => {
                AppError::Validation(format!("The given data was invalid: {}", body_text))
            }
            _ => AppError::BadRequest(format!("Invalid request body: {}", body_text)),
        };
        HttpAppError::new(error)
    }
}

/// JSON body extractor that answers with the envelope on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.error);

        let status = self.status();
        let body = ApiResponse::<()>::failure(self.message());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use cinetheque_core::GENERIC_FAILURE_MESSAGE;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_keeps_its_message() {
        let response =
            HttpAppError::new(AppError::NotFound("Movie not found".to_string())).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "data": null, "message": "Movie not found" })
        );
    }

    #[tokio::test]
    async fn sensitive_errors_hide_details() {
        let response = HttpAppError::new(AppError::Internal(
            "duplicate key value violates unique constraint".to_string(),
        ))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], GENERIC_FAILURE_MESSAGE);
        assert!(!body.to_string().contains("duplicate key"));
    }

    #[test]
    fn message_override_wins() {
        let error = HttpAppError::with_message(
            AppError::Storage("disk full".to_string()),
            "Error deleting movie",
        );
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message(), "Error deleting movie");
    }

    #[test]
    fn storage_errors_map_to_app_errors() {
        let not_found = storage_error_to_app_error(StorageError::NotFound("k".to_string()));
        assert!(matches!(not_found, AppError::NotFound(_)));

        let upload = storage_error_to_app_error(StorageError::UploadFailed("x".to_string()));
        assert!(matches!(upload, AppError::Storage(_)));
        assert!(upload.is_sensitive());
    }
}
