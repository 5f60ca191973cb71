//! JSON projections of stored entities

use chrono::{DateTime, NaiveDate, Utc};
use cinetheque_core::models::{Category, CategoryMovie, Media, MediaType, Movie};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MediaResource {
    pub id: Uuid,
    /// Path on the public disk, e.g. `poster/3f1c....jpg`
    pub media_path: Option<String>,
    pub media_url: Option<String>,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Media> for MediaResource {
    fn from(media: Media) -> Self {
        Self {
            id: media.id,
            media_path: media.media_path,
            media_url: media.media_url,
            media_type: media.media_type,
            created_at: media.created_at,
            updated_at: media.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryResource {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResource {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryMovieResource {
    pub id: Uuid,
    pub category_id: Uuid,
    pub movie_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryMovie> for CategoryMovieResource {
    fn from(link: CategoryMovie) -> Self {
        Self {
            id: link.id,
            category_id: link.category_id,
            movie_id: link.movie_id,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MovieResource {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub rate: i32,
    /// Runtime in minutes
    pub duration: i32,
    /// Poster, `null` when the movie has none
    pub media: Option<MediaResource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Movie> for MovieResource {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id,
            name: movie.name,
            description: movie.description,
            release_date: movie.release_date,
            rate: movie.rate,
            duration: movie.duration,
            media: movie.media.map(MediaResource::from),
            created_at: movie.created_at,
            updated_at: movie.updated_at,
        }
    }
}

/// Project a list, keeping its order
pub fn collection<T, R>(items: Vec<T>) -> Vec<R>
where
    R: From<T>,
{
    items.into_iter().map(R::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn poster() -> Media {
        Media {
            id: Uuid::new_v4(),
            media_path: Some("poster/dune.jpg".to_string()),
            media_url: Some("http://localhost:4000/storage/poster/dune.jpg".to_string()),
            media_type: MediaType::Poster,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dune(media: Option<Media>) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            name: "Dune".to_string(),
            description: "Spice must flow.".to_string(),
            release_date: NaiveDate::from_ymd_opt(2021, 9, 15).unwrap(),
            rate: 5,
            duration: 155,
            media_id: media.as_ref().map(|m| m.id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            media,
        }
    }

    #[test]
    fn movie_resource_embeds_media() {
        let media = poster();
        let resource = MovieResource::from(dune(Some(media.clone())));

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["release_date"], json!("2021-09-15"));
        assert_eq!(value["media"]["media_type"], json!("poster"));
        assert_eq!(value["media"]["media_path"], json!("poster/dune.jpg"));
        assert_eq!(value["media"]["id"], json!(media.id));
        assert!(value.get("media_id").is_none());
    }

    #[test]
    fn movie_without_media_serializes_null() {
        let value = serde_json::to_value(MovieResource::from(dune(None))).unwrap();
        assert_eq!(value["media"], serde_json::Value::Null);
    }

    #[test]
    fn collection_preserves_order() {
        let movies = vec![dune(None), dune(Some(poster())), dune(None)];
        let ids: Vec<Uuid> = movies.iter().map(|m| m.id).collect();

        let resources: Vec<MovieResource> = collection(movies);
        let projected: Vec<Uuid> = resources.iter().map(|r| r.id).collect();
        assert_eq!(ids, projected);
    }
}
