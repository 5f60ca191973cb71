//! TMDB importer for the Cinetheque catalog.
//!
//! [`TmdbClient`] talks to the movie database, [`CatalogSeeder`] turns its
//! genres into categories and its changed movies into catalog movies linked to
//! those categories. The `cinetheque-seed` binary wires both from
//! [`SeederConfig`].

pub mod config;
pub mod seeder;
pub mod tmdb;

pub use config::{SeederConfig, TmdbConfig};
pub use seeder::{CatalogSeeder, SeedError, SeedReport};
pub use tmdb::{Genre, MovieDetails, MovieSource, TmdbClient, TmdbError};
