//! Repository traits
//!
//! Every entity gets the same CRUD surface. `search` returns an empty vector when
//! nothing matched and `update` returns `None` when the change had no effect
//! (unknown id or empty change set); callers turn those into 404 / 422.

use async_trait::async_trait;
use cinetheque_core::models::{
    Category, CategoryChanges, CategoryMovie, CategoryMovieChanges, Media, MediaUpsert, Movie,
    MovieChanges, NewCategory, NewCategoryMovie, NewMovie,
};
use cinetheque_core::{AppError, PageRequest, Paginated};
use uuid::Uuid;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn index(&self, page: PageRequest) -> Result<Paginated<Category>, AppError>;

    /// Case-insensitive substring match on `name`
    async fn search(&self, query: &str) -> Result<Vec<Category>, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError>;

    /// Exact name match, ignoring case
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, AppError>;

    async fn store(&self, category: NewCategory) -> Result<Category, AppError>;

    async fn update(
        &self,
        changes: CategoryChanges,
        id: Uuid,
    ) -> Result<Option<Category>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Movies are always returned with their media eager-loaded.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn index(&self, page: PageRequest) -> Result<Paginated<Movie>, AppError>;

    /// Case-insensitive substring match on `name` or `description`
    async fn search(&self, query: &str) -> Result<Vec<Movie>, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Movie>, AppError>;

    async fn store(&self, movie: NewMovie) -> Result<Movie, AppError>;

    async fn update(&self, changes: MovieChanges, id: Uuid) -> Result<Option<Movie>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn index(&self, page: PageRequest) -> Result<Paginated<Media>, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Media>, AppError>;

    async fn store(&self, media: MediaUpsert) -> Result<Media, AppError>;

    async fn update(&self, media: MediaUpsert, id: Uuid) -> Result<Option<Media>, AppError>;

    /// Deleting a media row nulls `media_id` on the movie that referenced it
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Overwrite the row `existing` points at, or insert a new one when there is none.
    async fn store_or_update(
        &self,
        media: MediaUpsert,
        existing: Option<Uuid>,
    ) -> Result<Media, AppError> {
        if let Some(id) = existing {
            if let Some(updated) = self.update(media.clone(), id).await? {
                return Ok(updated);
            }
        }
        self.store(media).await
    }
}

#[async_trait]
pub trait CategoryMovieRepository: Send + Sync {
    async fn index(&self, page: PageRequest) -> Result<Paginated<CategoryMovie>, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<CategoryMovie>, AppError>;

    async fn store(&self, link: NewCategoryMovie) -> Result<CategoryMovie, AppError>;

    async fn update(
        &self,
        changes: CategoryMovieChanges,
        id: Uuid,
    ) -> Result<Option<CategoryMovie>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn exists(&self, category_id: Uuid, movie_id: Uuid) -> Result<bool, AppError>;
}

/// Access to the four repositories, bound either to the pool or to one transaction
pub trait Repositories: Send + Sync {
    fn categories(&self) -> &dyn CategoryRepository;
    fn movies(&self) -> &dyn MovieRepository;
    fn medias(&self) -> &dyn MediaRepository;
    fn category_movies(&self) -> &dyn CategoryMovieRepository;
}

/// Pool-bound repositories plus a transaction factory
#[async_trait]
pub trait Catalog: Repositories {
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>, AppError>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> Result<(), AppError>;
}

/// Repositories bound to a single open transaction.
///
/// Dropping the transaction without calling `commit` rolls it back.
#[async_trait]
pub trait CatalogTransaction: Repositories {
    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
