//! PostgreSQL repositories and the pool / transaction catalogs built from them

mod category;
mod category_movie;
mod executor;
mod media;
mod movie;

pub use category::PgCategoryRepository;
pub use category_movie::PgCategoryMovieRepository;
pub use media::PgMediaRepository;
pub use movie::PgMovieRepository;

use async_trait::async_trait;
use cinetheque_core::AppError;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

use executor::{take_transaction, PgExecutor, SharedTransaction};

use crate::repository::{
    Catalog, CatalogTransaction, CategoryMovieRepository, CategoryRepository, MediaRepository,
    MovieRepository, Repositories,
};

#[derive(Clone)]
struct PgRepositories {
    categories: PgCategoryRepository,
    movies: PgMovieRepository,
    medias: PgMediaRepository,
    category_movies: PgCategoryMovieRepository,
}

impl PgRepositories {
    fn new(db: PgExecutor) -> Self {
        Self {
            categories: PgCategoryRepository::new(db.clone()),
            movies: PgMovieRepository::new(db.clone()),
            medias: PgMediaRepository::new(db.clone()),
            category_movies: PgCategoryMovieRepository::new(db),
        }
    }
}

/// Catalog whose repositories run on the connection pool
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
    repos: PgRepositories,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        let repos = PgRepositories::new(PgExecutor::Pool(pool.clone()));
        Self { pool, repos }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Catalog whose repositories all share one open transaction
pub struct PgCatalogTransaction {
    tx: SharedTransaction,
    repos: PgRepositories,
}

macro_rules! impl_repositories {
    ($ty:ty) => {
        impl Repositories for $ty {
            fn categories(&self) -> &dyn CategoryRepository {
                &self.repos.categories
            }

            fn movies(&self) -> &dyn MovieRepository {
                &self.repos.movies
            }

            fn medias(&self) -> &dyn MediaRepository {
                &self.repos.medias
            }

            fn category_movies(&self) -> &dyn CategoryMovieRepository {
                &self.repos.category_movies
            }
        }
    };
}

impl_repositories!(PgCatalog);
impl_repositories!(PgCatalogTransaction);

#[async_trait]
impl Catalog for PgCatalog {
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        let tx: SharedTransaction = Arc::new(Mutex::new(Some(tx)));
        let repos = PgRepositories::new(PgExecutor::Transaction(tx.clone()));
        Ok(Box::new(PgCatalogTransaction { tx, repos }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogTransaction for PgCatalogTransaction {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let tx = take_transaction(&self.tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        let tx = take_transaction(&self.tx).await?;
        tx.rollback().await?;
        Ok(())
    }
}
