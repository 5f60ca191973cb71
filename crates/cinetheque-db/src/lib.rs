//! Cinetheque data access layer
//!
//! Repository traits for every catalog entity, their PostgreSQL implementations,
//! and the `Catalog` / `CatalogTransaction` pair handlers use to group writes
//! into one database transaction.

pub mod postgres;
pub mod repository;

#[cfg(any(test, feature = "mock"))]
pub mod memory;

pub use postgres::PgCatalog;
pub use repository::{
    Catalog, CatalogTransaction, CategoryMovieRepository, CategoryRepository, MediaRepository,
    MovieRepository, Repositories,
};

#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryCatalog;
