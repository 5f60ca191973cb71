//! Request payload extractors

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, StatusCode},
};
use chrono::NaiveDate;
use cinetheque_core::models::{MovieChanges, NewMovie};
use cinetheque_core::AppError;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{HttpAppError, ValidatedJson};
use crate::services::UploadedFile;

/// Name of the multipart field carrying the poster
pub const MEDIA_FIELD: &str = "media";

/// Movie fields as sent by the client. Every field is optional on the wire;
/// `store` requires them, `update` applies whichever are present.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MovieInput {
    #[schema(example = "A New Beginning")]
    pub name: Option<String>,
    #[schema(example = "It's a story about a new beginning...")]
    pub description: Option<String>,
    #[schema(example = "2021-09-15")]
    pub release_date: Option<NaiveDate>,
    #[schema(example = 5)]
    pub rate: Option<i32>,
    /// Runtime in minutes
    #[schema(example = 120)]
    pub duration: Option<i32>,
}

impl MovieInput {
    /// Build an insert, reporting every missing required field at once
    pub fn into_new_movie(self, media_id: Option<Uuid>) -> Result<NewMovie, AppError> {
        let missing: Vec<String> = [
            ("name", self.name.is_none()),
            ("description", self.description.is_none()),
            ("release_date", self.release_date.is_none()),
        ]
        .into_iter()
        .filter(|(_, absent)| *absent)
        .map(|(field, _)| format!("The {} field is required.", field))
        .collect();

        let (Some(name), Some(description), Some(release_date)) =
            (self.name, self.description, self.release_date)
        else {
            return Err(AppError::Validation(missing.join(" ")));
        };

        let movie = NewMovie {
            name,
            description,
            release_date,
            rate: self.rate.unwrap_or(0),
            duration: self.duration.unwrap_or(0),
            media_id,
        };
        movie.validate()?;
        Ok(movie)
    }

    /// Build a partial update; media is decided by the handler
    pub fn into_changes(self) -> Result<MovieChanges, AppError> {
        let changes = MovieChanges {
            name: self.name,
            description: self.description,
            release_date: self.release_date,
            rate: self.rate,
            duration: self.duration,
            media_id: None,
        };
        changes.validate()?;
        Ok(changes)
    }
}

/// Movie body: JSON, or `multipart/form-data` with an optional `media` file.
#[derive(Debug)]
pub struct MoviePayload {
    pub input: MovieInput,
    pub media: Option<UploadedFile>,
}

impl<S> FromRequest<S> for MoviePayload
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let ValidatedJson(input) = ValidatedJson::<MovieInput>::from_request(req, state).await?;
            return Ok(Self { input, media: None });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?;

        Ok(read_multipart(multipart).await?)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<MoviePayload, AppError> {
    let mut input = MovieInput::default();
    let mut media = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == MEDIA_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            media = Some(UploadedFile {
                file_name,
                content_type,
                data,
            });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "name" => input.name = Some(value.to_string()),
            "description" => input.description = Some(value.to_string()),
            "release_date" => input.release_date = Some(parse_date(value)?),
            "rate" => input.rate = Some(parse_integer("rate", value)?),
            "duration" => input.duration = Some(parse_integer("duration", value)?),
            other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    Ok(MoviePayload { input, media })
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::Validation("The release_date field must be a valid date.".to_string())
    })
}

fn parse_integer(field: &str, value: &str) -> Result<i32, AppError> {
    value
        .parse::<i32>()
        .map_err(|_| AppError::Validation(format!("The {} field must be an integer.", field)))
}
