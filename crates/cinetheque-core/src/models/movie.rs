use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

use super::media::Media;

/// Maximum length of a movie name (matches `movies.name VARCHAR(128)`)
pub const MOVIE_NAME_MAX_LEN: u64 = 128;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Movie {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub rate: i32,
    /// Runtime in minutes
    pub duration: i32,
    pub media_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Eager-loaded poster, filled by the repository
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewMovie {
    #[validate(length(
        min = 1,
        max = 128,
        message = "The name field must be between 1 and 128 characters."
    ))]
    pub name: String,
    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: String,
    pub release_date: NaiveDate,
    #[validate(range(min = 0, message = "The rate field must be at least 0."))]
    pub rate: i32,
    #[validate(range(min = 0, message = "The duration field must be at least 0."))]
    pub duration: i32,
    pub media_id: Option<Uuid>,
}

/// Partial update of a movie.
///
/// `media_id` is doubly optional: `None` leaves it alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct MovieChanges {
    #[validate(length(
        min = 1,
        max = 128,
        message = "The name field must be between 1 and 128 characters."
    ))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "The description field is required."))]
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "The rate field must be at least 0."))]
    pub rate: Option<i32>,
    #[validate(range(min = 0, message = "The duration field must be at least 0."))]
    pub duration: Option<i32>,
    pub media_id: Option<Option<Uuid>>,
}

impl MovieChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.release_date.is_none()
            && self.rate.is_none()
            && self.duration.is_none()
            && self.media_id.is_none()
    }
}
