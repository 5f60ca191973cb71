use async_trait::async_trait;
use cinetheque_core::models::{Media, Movie, MovieChanges, NewMovie};
use cinetheque_core::{AppError, PageRequest, Paginated};
use sqlx::{PgConnection, Postgres};
use std::collections::HashMap;
use uuid::Uuid;

use super::executor::{like_pattern, PgExecutor};
use super::media::MEDIA_COLUMNS;
use crate::repository::MovieRepository;

const COLUMNS: &str =
    "id, name, description, release_date, rate, duration, media_id, created_at, updated_at";

/// Repository for the `movies` table
#[derive(Clone)]
pub struct PgMovieRepository {
    db: PgExecutor,
}

impl PgMovieRepository {
    pub(crate) fn new(db: PgExecutor) -> Self {
        Self { db }
    }
}

/// Fill `movie.media` for every movie that references a media row (one query).
async fn attach_media(conn: &mut PgConnection, movies: &mut [Movie]) -> Result<(), AppError> {
    let ids: Vec<Uuid> = movies.iter().filter_map(|m| m.media_id).collect();
    if ids.is_empty() {
        return Ok(());
    }

    let medias = sqlx::query_as::<Postgres, Media>(&format!(
        "SELECT {MEDIA_COLUMNS} FROM medias WHERE id = ANY($1)"
    ))
    .bind(&ids)
    .fetch_all(conn)
    .await?;

    let by_id: HashMap<Uuid, Media> = medias.into_iter().map(|m| (m.id, m)).collect();
    for movie in movies.iter_mut() {
        movie.media = movie.media_id.and_then(|id| by_id.get(&id).cloned());
    }

    Ok(())
}

async fn with_media(conn: &mut PgConnection, movie: Option<Movie>) -> Result<Option<Movie>, AppError> {
    match movie {
        Some(movie) => {
            let mut movies = [movie];
            attach_media(conn, &mut movies).await?;
            let [movie] = movies;
            Ok(Some(movie))
        }
        None => Ok(None),
    }
}

#[async_trait]
impl MovieRepository for PgMovieRepository {
    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "select"))]
    async fn index(&self, page: PageRequest) -> Result<Paginated<Movie>, AppError> {
        let mut guard = self.db.acquire().await?;

        let total = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(guard.conn()?)
            .await?;

        let mut movies = sqlx::query_as::<Postgres, Movie>(&format!(
            "SELECT {COLUMNS} FROM movies ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(guard.conn()?)
        .await?;

        attach_media(guard.conn()?, &mut movies).await?;

        Ok(Paginated::new(movies, total, page))
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "select"))]
    async fn search(&self, query: &str) -> Result<Vec<Movie>, AppError> {
        let mut guard = self.db.acquire().await?;

        let mut movies = sqlx::query_as::<Postgres, Movie>(&format!(
            r#"
            SELECT {COLUMNS} FROM movies
            WHERE name ILIKE $1 OR description ILIKE $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(like_pattern(query))
        .fetch_all(guard.conn()?)
        .await?;

        attach_media(guard.conn()?, &mut movies).await?;

        Ok(movies)
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "select", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Movie>, AppError> {
        let mut guard = self.db.acquire().await?;

        let movie = sqlx::query_as::<Postgres, Movie>(&format!(
            "SELECT {COLUMNS} FROM movies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(guard.conn()?)
        .await?;

        with_media(guard.conn()?, movie).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "insert"))]
    async fn store(&self, movie: NewMovie) -> Result<Movie, AppError> {
        let mut guard = self.db.acquire().await?;

        let movie = sqlx::query_as::<Postgres, Movie>(&format!(
            r#"
            INSERT INTO movies (id, name, description, release_date, rate, duration, media_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&movie.name)
        .bind(&movie.description)
        .bind(movie.release_date)
        .bind(movie.rate)
        .bind(movie.duration)
        .bind(movie.media_id)
        .fetch_one(guard.conn()?)
        .await?;

        let movie = with_media(guard.conn()?, Some(movie)).await?;
        movie.ok_or_else(|| AppError::Internal("Inserted movie was not returned".to_string()))
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "update", db.record_id = %id))]
    async fn update(&self, changes: MovieChanges, id: Uuid) -> Result<Option<Movie>, AppError> {
        if changes.is_empty() {
            return Ok(None);
        }

        let mut guard = self.db.acquire().await?;

        let (set_media, media_id) = match changes.media_id {
            Some(media_id) => (true, media_id),
            None => (false, None),
        };

        let movie = sqlx::query_as::<Postgres, Movie>(&format!(
            r#"
            UPDATE movies
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                release_date = COALESCE($4, release_date),
                rate = COALESCE($5, rate),
                duration = COALESCE($6, duration),
                media_id = CASE WHEN $7 THEN $8 ELSE media_id END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.release_date)
        .bind(changes.rate)
        .bind(changes.duration)
        .bind(set_media)
        .bind(media_id)
        .fetch_optional(guard.conn()?)
        .await?;

        with_media(guard.conn()?, movie).await
    }

    #[tracing::instrument(skip(self), fields(db.table = "movies", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut guard = self.db.acquire().await?;

        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(guard.conn()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
