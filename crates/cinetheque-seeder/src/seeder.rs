//! Import TMDB genres and movies into the catalog

use chrono::NaiveDate;
use cinetheque_core::models::{NewCategory, NewCategoryMovie, NewMovie};
use cinetheque_core::AppError;
use cinetheque_db::{Catalog, CatalogTransaction, Repositories};
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use crate::tmdb::{MovieDetails, MovieSource, TmdbError};

const UNTITLED: &str = "NO TITLE";
const NO_OVERVIEW: &str = "No overview available.";
const MOVIE_NAME_MAX_CHARS: usize = 128;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Source(#[from] TmdbError),

    #[error(transparent)]
    Catalog(#[from] AppError),
}

/// Outcome of a movie import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    /// Missing upstream, failed to fetch, or without a usable release date
    pub skipped: usize,
    pub linked: usize,
    /// Genres with no category of the same name
    pub unknown_genres: usize,
}

pub struct CatalogSeeder {
    catalog: Arc<dyn Catalog>,
    source: Arc<dyn MovieSource>,
}

impl CatalogSeeder {
    pub fn new(catalog: Arc<dyn Catalog>, source: Arc<dyn MovieSource>) -> Self {
        Self { catalog, source }
    }

    /// Create a category for every genre not already present. Returns how many were created.
    #[tracing::instrument(skip(self))]
    pub async fn seed_categories(&self) -> Result<usize, SeedError> {
        let genres = self.source.genres().await?;
        let mut created = 0;

        for genre in genres {
            let name = genre.name.trim().to_string();
            if self.catalog.categories().find_by_name(&name).await?.is_some() {
                tracing::debug!(genre = %name, "Category already present");
                continue;
            }

            let category = NewCategory { name };
            if let Err(e) = category.validate() {
                tracing::warn!(genre = %category.name, error = %e, "Skipping invalid genre");
                continue;
            }
            self.catalog.categories().store(category).await?;
            created += 1;
        }

        tracing::info!(created, "Categories seeded");
        Ok(created)
    }

    /// Import the movies of the first `pages` pages of the change feed.
    ///
    /// Each movie and its genre links are written in their own transaction.
    #[tracing::instrument(skip(self))]
    pub async fn seed_movies(&self, pages: u32) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        for page in 1..=pages {
            let ids = self.source.changed_movie_ids(page).await?;
            tracing::info!(page, count = ids.len(), "Fetched changed movies");

            for id in ids {
                let details = match self.source.movie(id).await {
                    Ok(Some(details)) => details,
                    Ok(None) => {
                        tracing::debug!(tmdb_id = id, "Movie not found upstream");
                        report.skipped += 1;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(tmdb_id = id, error = %e, "Failed to fetch movie, skipping");
                        report.skipped += 1;
                        continue;
                    }
                };

                let Some(movie) = movie_from_details(&details) else {
                    tracing::debug!(tmdb_id = id, "Movie without a usable release date or title");
                    report.skipped += 1;
                    continue;
                };

                self.import_movie(movie, &details, &mut report).await?;
            }
        }

        tracing::info!(?report, "Movies seeded");
        Ok(report)
    }

    async fn import_movie(
        &self,
        movie: NewMovie,
        details: &MovieDetails,
        report: &mut SeedReport,
    ) -> Result<(), SeedError> {
        let tx = self.catalog.begin().await?;

        match store_with_genres(tx.as_ref(), movie, details).await {
            Ok((linked, unknown)) => {
                tx.commit().await?;
                report.created += 1;
                report.linked += linked;
                report.unknown_genres += unknown;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        error = %rollback_err,
                        original_error = %e,
                        "Failed to rollback movie import"
                    );
                }
                Err(e.into())
            }
        }
    }
}

/// Returns (links created, unknown genres)
async fn store_with_genres(
    tx: &dyn CatalogTransaction,
    movie: NewMovie,
    details: &MovieDetails,
) -> Result<(usize, usize), AppError> {
    let movie = tx.movies().store(movie).await?;
    let mut linked = 0;
    let mut unknown = 0;

    for genre in &details.genres {
        let Some(category) = tx.categories().find_by_name(genre.name.trim()).await? else {
            tracing::warn!(genre = %genre.name, tmdb_id = details.id, "No category for genre");
            unknown += 1;
            continue;
        };
        if tx.category_movies().exists(category.id, movie.id).await? {
            continue;
        }
        tx.category_movies()
            .store(NewCategoryMovie {
                category_id: category.id,
                movie_id: movie.id,
            })
            .await?;
        linked += 1;
    }

    Ok((linked, unknown))
}

/// Map TMDB details to a catalog movie; `None` when the release date is
/// missing or unparseable or the result fails validation.
pub fn movie_from_details(details: &MovieDetails) -> Option<NewMovie> {
    let release_date = details
        .release_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())?;

    let name = [details.title.as_deref(), details.original_title.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or(UNTITLED);

    let description = details
        .overview
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .unwrap_or(NO_OVERVIEW);

    let movie = NewMovie {
        name: name.chars().take(MOVIE_NAME_MAX_CHARS).collect(),
        description: description.to_string(),
        release_date,
        rate: details.vote_average.unwrap_or(0.0).round().max(0.0) as i32,
        duration: details.runtime.unwrap_or(0).max(0),
        media_id: None,
    };
    movie.validate().ok()?;
    Some(movie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::Genre;
    use async_trait::async_trait;
    use cinetheque_db::MemoryCatalog;
    use std::collections::HashMap;

    struct FakeSource {
        genres: Vec<Genre>,
        pages: HashMap<u32, Vec<i64>>,
        movies: HashMap<i64, MovieDetails>,
        failing: Vec<i64>,
    }

    #[async_trait]
    impl MovieSource for FakeSource {
        async fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
            Ok(self.genres.clone())
        }

        async fn changed_movie_ids(&self, page: u32) -> Result<Vec<i64>, TmdbError> {
            Ok(self.pages.get(&page).cloned().unwrap_or_default())
        }

        async fn movie(&self, id: i64) -> Result<Option<MovieDetails>, TmdbError> {
            if self.failing.contains(&id) {
                return Err(TmdbError::UnexpectedStatus {
                    status: 500,
                    url: format!("/movie/{}", id),
                });
            }
            Ok(self.movies.get(&id).cloned())
        }
    }

    fn genre(id: i64, name: &str) -> Genre {
        Genre {
            id,
            name: name.to_string(),
        }
    }

    fn details(id: i64, title: &str, genres: Vec<Genre>) -> MovieDetails {
        MovieDetails {
            id,
            title: Some(title.to_string()),
            original_title: None,
            overview: Some(format!("{} overview", title)),
            release_date: Some("2021-09-15".to_string()),
            vote_average: Some(7.6),
            runtime: Some(155),
            genres,
        }
    }

    fn source() -> FakeSource {
        let scifi = genre(878, "Science Fiction");
        let drama = genre(18, "Drama");
        let western = genre(37, "Western");

        let mut undated = details(4, "Undated", vec![]);
        undated.release_date = Some(String::new());

        FakeSource {
            genres: vec![scifi.clone(), drama.clone()],
            pages: HashMap::from([(1, vec![1, 2, 3]), (2, vec![4, 5])]),
            movies: HashMap::from([
                (1, details(1, "Dune", vec![scifi.clone(), drama.clone()])),
                (2, details(2, "Heat", vec![drama, western])),
                (4, undated),
                (5, details(5, "Arrival", vec![scifi])),
            ]),
            failing: vec![3],
        }
    }

    fn seeder(catalog: &MemoryCatalog) -> CatalogSeeder {
        CatalogSeeder::new(Arc::new(catalog.clone()), Arc::new(source()))
    }

    #[tokio::test]
    async fn categories_are_created_once() {
        let catalog = MemoryCatalog::new();
        let seeder = seeder(&catalog);

        assert_eq!(seeder.seed_categories().await.unwrap(), 2);
        assert_eq!(seeder.seed_categories().await.unwrap(), 0);
        assert!(catalog
            .categories()
            .find_by_name("Drama")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn movies_are_imported_and_linked() {
        let catalog = MemoryCatalog::new();
        let seeder = seeder(&catalog);
        seeder.seed_categories().await.unwrap();

        let report = seeder.seed_movies(2).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                created: 3,
                skipped: 2,
                linked: 4,
                unknown_genres: 1,
            }
        );
        assert_eq!(catalog.movie_count(), 3);

        let dune = catalog.movies().search("Dune").await.unwrap();
        assert_eq!(dune[0].rate, 8);
        assert_eq!(dune[0].duration, 155);
    }

    #[tokio::test]
    async fn only_requested_pages_are_read() {
        let catalog = MemoryCatalog::new();
        let report = seeder(&catalog).seed_movies(1).await.unwrap();

        assert_eq!(report.created, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.unknown_genres, 4);
    }

    #[tokio::test]
    async fn failed_write_rolls_back_the_movie() {
        let catalog = MemoryCatalog::new();
        let seeder = seeder(&catalog);
        catalog.fail_writes(true);

        let err = seeder.seed_movies(1).await.unwrap_err();

        assert!(matches!(err, SeedError::Catalog(_)));
        catalog.fail_writes(false);
        assert_eq!(catalog.movie_count(), 0);
    }

    #[test]
    fn title_falls_back_to_original_then_placeholder() {
        let mut d = details(1, "Dune", vec![]);
        d.title = None;
        d.original_title = Some("Dune: Part One".to_string());
        assert_eq!(movie_from_details(&d).unwrap().name, "Dune: Part One");

        d.original_title = Some("  ".to_string());
        assert_eq!(movie_from_details(&d).unwrap().name, "NO TITLE");
    }

    #[test]
    fn missing_runtime_and_overview_get_defaults() {
        let mut d = details(1, "Dune", vec![]);
        d.runtime = None;
        d.overview = None;
        d.vote_average = Some(2.4);

        let movie = movie_from_details(&d).unwrap();
        assert_eq!(movie.duration, 0);
        assert_eq!(movie.rate, 2);
        assert_eq!(movie.description, "No overview available.");
    }

    #[test]
    fn unparseable_date_is_skipped() {
        let mut d = details(1, "Dune", vec![]);
        d.release_date = Some("15/09/2021".to_string());
        assert!(movie_from_details(&d).is_none());
        d.release_date = None;
        assert!(movie_from_details(&d).is_none());
    }

    #[test]
    fn long_titles_are_truncated() {
        let d = details(1, &"x".repeat(300), vec![]);
        assert_eq!(movie_from_details(&d).unwrap().name.chars().count(), 128);
    }
}
