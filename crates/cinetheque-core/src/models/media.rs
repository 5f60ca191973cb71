use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// Kind of uploaded file.
///
/// Stored as the `media_types` lookup id (SMALLINT); the migration seeds the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Poster = 1,
    Image = 2,
    Video = 3,
    File = 4,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::Poster,
        MediaType::Image,
        MediaType::Video,
        MediaType::File,
    ];

    /// Lookup name, also used as the storage directory for files of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Poster => "poster",
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::File => "file",
        }
    }
}

impl FromStr for MediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poster" => Ok(MediaType::Poster),
            "image" => Ok(MediaType::Image),
            "video" => Ok(MediaType::Video),
            "file" => Ok(MediaType::File),
            _ => Err(anyhow::anyhow!("Invalid media type: {}", s)),
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Uploaded file record (`medias` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Media {
    pub id: Uuid,
    /// Path relative to the public disk, e.g. `poster/3f1c....jpg`
    pub media_path: Option<String>,
    pub media_url: Option<String>,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by `store_or_update`
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUpsert {
    pub media_path: Option<String>,
    pub media_url: Option<String>,
    pub media_type: MediaType,
}
