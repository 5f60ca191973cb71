use async_trait::async_trait;
use cinetheque_core::models::{Category, CategoryChanges, NewCategory};
use cinetheque_core::{AppError, PageRequest, Paginated};
use sqlx::Postgres;
use uuid::Uuid;

use super::executor::{like_pattern, PgExecutor};
use crate::repository::CategoryRepository;

const COLUMNS: &str = "id, name, created_at, updated_at";

/// Repository for the `categories` table
#[derive(Clone)]
pub struct PgCategoryRepository {
    db: PgExecutor,
}

impl PgCategoryRepository {
    pub(crate) fn new(db: PgExecutor) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "select"))]
    async fn index(&self, page: PageRequest) -> Result<Paginated<Category>, AppError> {
        let mut guard = self.db.acquire().await?;

        let total = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(guard.conn()?)
            .await?;

        let categories = sqlx::query_as::<Postgres, Category>(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(page.per_page())
        .bind(page.offset())
        .fetch_all(guard.conn()?)
        .await?;

        Ok(Paginated::new(categories, total, page))
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "select"))]
    async fn search(&self, query: &str) -> Result<Vec<Category>, AppError> {
        let mut guard = self.db.acquire().await?;

        let categories = sqlx::query_as::<Postgres, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE name ILIKE $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(like_pattern(query))
        .fetch_all(guard.conn()?)
        .await?;

        Ok(categories)
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "select", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let mut guard = self.db.acquire().await?;

        let category = sqlx::query_as::<Postgres, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "select"))]
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let mut guard = self.db.acquire().await?;

        let category = sqlx::query_as::<Postgres, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE LOWER(name) = LOWER($1) LIMIT 1"
        ))
        .bind(name)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "insert"))]
    async fn store(&self, category: NewCategory) -> Result<Category, AppError> {
        let mut guard = self.db.acquire().await?;

        let category = sqlx::query_as::<Postgres, Category>(&format!(
            "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&category.name)
        .fetch_one(guard.conn()?)
        .await?;

        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "update", db.record_id = %id))]
    async fn update(
        &self,
        changes: CategoryChanges,
        id: Uuid,
    ) -> Result<Option<Category>, AppError> {
        if changes.is_empty() {
            return Ok(None);
        }

        let mut guard = self.db.acquire().await?;

        let category = sqlx::query_as::<Postgres, Category>(&format!(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name), updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .fetch_optional(guard.conn()?)
        .await?;

        Ok(category)
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut guard = self.db.acquire().await?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(guard.conn()?)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
