use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Join row linking a movie to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct CategoryMovie {
    pub id: Uuid,
    pub category_id: Uuid,
    pub movie_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCategoryMovie {
    pub category_id: Uuid,
    pub movie_id: Uuid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CategoryMovieChanges {
    pub category_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
}

impl CategoryMovieChanges {
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none() && self.movie_id.is_none()
    }
}
