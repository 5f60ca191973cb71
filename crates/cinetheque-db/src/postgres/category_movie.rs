use async_trait::async_trait;
use cinetheque_core::models::{CategoryMovie, CategoryMovieChanges, NewCategoryMovie};
use cinetheque_core::{AppError, PageRequest, Paginated};
use sqlx::Postgres;
use uuid::Uuid;

use super::executor::PgExecutor;
use crate::repository::CategoryMovieRepository;

const COLUMNS: &str = "id, category_id, movie_id, created_at, updated_at";

/// Repository for the `category_movies` join table
#[derive(Clone)]
pub struct PgCategoryMovieRepository {
    db: PgExecutor,
}

impl PgCategoryMovieRepository {
    pub(crate) fn new(db: PgExecutor) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryMovieRepository for PgCategoryMovieRepository {
    #[tracing::instrument(skip(self), fields(db.table = "category_movies", db.operation = "select"))]
    async fn index(&self, page: PageRequest) -> Result<Paginated<CategoryMovie>, AppError> {
        let mut guard = self.db.acquire().await?;

        let total = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM category_movies")
            .fetch_one(guard.conn()?)
            .await?;

        let links = sqlx::query_as::<Postgres, CategoryMovie>(&format!(
            "SELECT {COLUMNS} FROM category_movies ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(guard.conn()?)
        .await?;

        Ok(Paginated::new(links, total, page))
    }

    #[tracing::instrument(skip(self), fields(db.table = "category_movies", db.operation = "select", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<CategoryMovie>, AppError> {
        let mut guard = self.db.acquire().await?;

        let link = sqlx::query_as::<Postgres, CategoryMovie>(&format!(
            "SELECT {COLUMNS} FROM category_movies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(link)
    }

    #[tracing::instrument(skip(self), fields(db.table = "category_movies", db.operation = "insert"))]
    async fn store(&self, link: NewCategoryMovie) -> Result<CategoryMovie, AppError> {
        let mut guard = self.db.acquire().await?;

        let link = sqlx::query_as::<Postgres, CategoryMovie>(&format!(
            r#"
            INSERT INTO category_movies (id, category_id, movie_id)
            VALUES ($1, $2, $3)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(link.category_id)
        .bind(link.movie_id)
        .fetch_one(guard.conn()?)
        .await?;

        Ok(link)
    }

    #[tracing::instrument(skip(self), fields(db.table = "category_movies", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        changes: CategoryMovieChanges,
        id: Uuid,
    ) -> Result<Option<CategoryMovie>, AppError> {
        if changes.is_empty() {
            return Ok(None);
        }

        let mut guard = self.db.acquire().await?;

        let link = sqlx::query_as::<Postgres, CategoryMovie>(&format!(
            r#"
            UPDATE category_movies
            SET category_id = COALESCE($2, category_id),
                movie_id = COALESCE($3, movie_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.category_id)
        .bind(changes.movie_id)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(link)
    }

    #[tracing::instrument(skip(self), fields(db.table = "category_movies", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut guard = self.db.acquire().await?;

        let result = sqlx::query("DELETE FROM category_movies WHERE id = $1")
            .bind(id)
            .execute(guard.conn()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "category_movies", db.operation = "select"))]
    async fn exists(&self, category_id: Uuid, movie_id: Uuid) -> Result<bool, AppError> {
        let mut guard = self.db.acquire().await?;

        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM category_movies WHERE category_id = $1 AND movie_id = $2)",
        )
        .bind(category_id)
        .bind(movie_id)
        .fetch_one(guard.conn()?)
        .await?;

        Ok(exists)
    }
}
