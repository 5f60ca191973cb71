use async_trait::async_trait;
use cinetheque_core::models::{Media, MediaUpsert};
use cinetheque_core::{AppError, PageRequest, Paginated};
use sqlx::Postgres;
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::repository::MediaRepository;

pub(crate) const MEDIA_COLUMNS: &str =
    "id, media_path, media_url, media_type, created_at, updated_at";

/// Repository for the `medias` table
#[derive(Clone)]
pub struct PgMediaRepository {
    db: PgExecutor,
}

impl PgMediaRepository {
    pub(crate) fn new(db: PgExecutor) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MediaRepository for PgMediaRepository {
    #[tracing::instrument(skip(self), fields(db.table = "medias", db.operation = "select"))]
    async fn index(&self, page: PageRequest) -> Result<Paginated<Media>, AppError> {
        let mut guard = self.db.acquire().await?;

        let total = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM medias")
            .fetch_one(guard.conn()?)
            .await?;

        let medias = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM medias ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(guard.conn()?)
        .await?;

        Ok(Paginated::new(medias, total, page))
    }

    #[tracing::instrument(skip(self), fields(db.table = "medias", db.operation = "select", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        let mut guard = self.db.acquire().await?;

        let media = sqlx::query_as::<Postgres, Media>(&format!(
            "SELECT {MEDIA_COLUMNS} FROM medias WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "medias", db.operation = "insert"))]
    async fn store(&self, media: MediaUpsert) -> Result<Media, AppError> {
        let mut guard = self.db.acquire().await?;

        let media = sqlx::query_as::<Postgres, Media>(&format!(
            r#"
            INSERT INTO medias (id, media_path, media_url, media_type)
            VALUES ($1, $2, $3, $4)
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&media.media_path)
        .bind(&media.media_url)
        .bind(media.media_type)
        .fetch_one(guard.conn()?)
        .await?;

        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "medias", db.operation = "update", db.record_id = %id))]
    async fn update(&self, media: MediaUpsert, id: Uuid) -> Result<Option<Media>, AppError> {
        let mut guard = self.db.acquire().await?;

        let media = sqlx::query_as::<Postgres, Media>(&format!(
            r#"
            UPDATE medias
            SET media_path = $2, media_url = $3, media_type = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {MEDIA_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&media.media_path)
        .bind(&media.media_url)
        .bind(media.media_type)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(media)
    }

    #[tracing::instrument(skip(self), fields(db.table = "medias", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut guard = self.db.acquire().await?;

        // movies.media_id is ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM medias WHERE id = $1")
            .bind(id)
            .execute(guard.conn()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
