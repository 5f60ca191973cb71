//! In-memory catalog for tests
//!
//! Mirrors the PostgreSQL behavior the handlers rely on: insertion ordering,
//! case-insensitive substring search, cascading deletes of category links and
//! `media_id` being nulled when its media row goes away. A transaction works
//! on a snapshot of the tables that replaces the shared state on commit.

use async_trait::async_trait;
use chrono::Utc;
use cinetheque_core::models::{
    Category, CategoryChanges, CategoryMovie, CategoryMovieChanges, Media, MediaUpsert, Movie,
    MovieChanges, NewCategory, NewCategoryMovie, NewMovie,
};
use cinetheque_core::{AppError, PageRequest, Paginated};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::repository::{
    Catalog, CatalogTransaction, CategoryMovieRepository, CategoryRepository, MediaRepository,
    MovieRepository, Repositories,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    categories: Vec<Category>,
    movies: Vec<Movie>,
    medias: Vec<Media>,
    category_movies: Vec<CategoryMovie>,
}

impl Tables {
    fn movie_with_media(&self, movie: &Movie) -> Movie {
        let mut movie = movie.clone();
        movie.media = movie
            .media_id
            .and_then(|id| self.medias.iter().find(|m| m.id == id).cloned());
        movie
    }
}

fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> Paginated<T> {
    let items = rows
        .iter()
        .skip(page.offset() as usize)
        .take(page.per_page() as usize)
        .cloned()
        .collect();
    Paginated::new(items, rows.len() as i64, page)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// One set of tables plus a switch that makes every write fail
#[derive(Clone)]
struct MemoryTables {
    tables: Arc<Mutex<Tables>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryTables {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("Simulated write failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryTables {
    async fn index(&self, page: PageRequest) -> Result<Paginated<Category>, AppError> {
        Ok(paginate(&self.lock().categories, page))
    }

    async fn search(&self, query: &str) -> Result<Vec<Category>, AppError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .filter(|c| contains_ignore_case(&c.name, query))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        Ok(self
            .lock()
            .categories
            .iter()
            .find(|c| c.name.to_lowercase() == name.to_lowercase())
            .cloned())
    }

    async fn store(&self, category: NewCategory) -> Result<Category, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if tables.categories.iter().any(|c| c.name == category.name) {
            return Err(AppError::Internal(format!(
                "duplicate category name: {}",
                category.name
            )));
        }
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            name: category.name,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        changes: CategoryChanges,
        id: Uuid,
    ) -> Result<Option<Category>, AppError> {
        self.check_writable()?;
        if changes.is_empty() {
            return Ok(None);
        }
        let mut tables = self.lock();
        let Some(category) = tables.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            category.name = name;
        }
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        let removed = tables.categories.len() < before;
        if removed {
            tables.category_movies.retain(|l| l.category_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MovieRepository for MemoryTables {
    async fn index(&self, page: PageRequest) -> Result<Paginated<Movie>, AppError> {
        let tables = self.lock();
        Ok(paginate(&tables.movies, page).map(|m| tables.movie_with_media(&m)))
    }

    async fn search(&self, query: &str) -> Result<Vec<Movie>, AppError> {
        let tables = self.lock();
        Ok(tables
            .movies
            .iter()
            .filter(|m| {
                contains_ignore_case(&m.name, query) || contains_ignore_case(&m.description, query)
            })
            .map(|m| tables.movie_with_media(m))
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Movie>, AppError> {
        let tables = self.lock();
        Ok(tables
            .movies
            .iter()
            .find(|m| m.id == id)
            .map(|m| tables.movie_with_media(m)))
    }

    async fn store(&self, movie: NewMovie) -> Result<Movie, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        if let Some(media_id) = movie.media_id {
            if !tables.medias.iter().any(|m| m.id == media_id) {
                return Err(AppError::Internal(format!("unknown media_id {}", media_id)));
            }
        }
        let now = Utc::now();
        let movie = Movie {
            id: Uuid::new_v4(),
            name: movie.name,
            description: movie.description,
            release_date: movie.release_date,
            rate: movie.rate,
            duration: movie.duration,
            media_id: movie.media_id,
            created_at: now,
            updated_at: now,
            media: None,
        };
        tables.movies.push(movie.clone());
        Ok(tables.movie_with_media(&movie))
    }

    async fn update(&self, changes: MovieChanges, id: Uuid) -> Result<Option<Movie>, AppError> {
        self.check_writable()?;
        if changes.is_empty() {
            return Ok(None);
        }
        let mut tables = self.lock();
        let Some(movie) = tables.movies.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            movie.name = name;
        }
        if let Some(description) = changes.description {
            movie.description = description;
        }
        if let Some(release_date) = changes.release_date {
            movie.release_date = release_date;
        }
        if let Some(rate) = changes.rate {
            movie.rate = rate;
        }
        if let Some(duration) = changes.duration {
            movie.duration = duration;
        }
        if let Some(media_id) = changes.media_id {
            movie.media_id = media_id;
        }
        movie.updated_at = Utc::now();
        let movie = movie.clone();
        Ok(Some(tables.movie_with_media(&movie)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let before = tables.movies.len();
        tables.movies.retain(|m| m.id != id);
        let removed = tables.movies.len() < before;
        if removed {
            tables.category_movies.retain(|l| l.movie_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl MediaRepository for MemoryTables {
    async fn index(&self, page: PageRequest) -> Result<Paginated<Media>, AppError> {
        Ok(paginate(&self.lock().medias, page))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Media>, AppError> {
        Ok(self.lock().medias.iter().find(|m| m.id == id).cloned())
    }

    async fn store(&self, media: MediaUpsert) -> Result<Media, AppError> {
        self.check_writable()?;
        let now = Utc::now();
        let media = Media {
            id: Uuid::new_v4(),
            media_path: media.media_path,
            media_url: media.media_url,
            media_type: media.media_type,
            created_at: now,
            updated_at: now,
        };
        self.lock().medias.push(media.clone());
        Ok(media)
    }

    async fn update(&self, media: MediaUpsert, id: Uuid) -> Result<Option<Media>, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let Some(row) = tables.medias.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        row.media_path = media.media_path;
        row.media_url = media.media_url;
        row.media_type = media.media_type;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let before = tables.medias.len();
        tables.medias.retain(|m| m.id != id);
        let removed = tables.medias.len() < before;
        if removed {
            for movie in tables.movies.iter_mut().filter(|m| m.media_id == Some(id)) {
                movie.media_id = None;
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl CategoryMovieRepository for MemoryTables {
    async fn index(&self, page: PageRequest) -> Result<Paginated<CategoryMovie>, AppError> {
        Ok(paginate(&self.lock().category_movies, page))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<CategoryMovie>, AppError> {
        Ok(self
            .lock()
            .category_movies
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn store(&self, link: NewCategoryMovie) -> Result<CategoryMovie, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let category_known = tables.categories.iter().any(|c| c.id == link.category_id);
        let movie_known = tables.movies.iter().any(|m| m.id == link.movie_id);
        if !category_known || !movie_known {
            return Err(AppError::Internal(
                "category_movies foreign key violation".to_string(),
            ));
        }
        let now = Utc::now();
        let link = CategoryMovie {
            id: Uuid::new_v4(),
            category_id: link.category_id,
            movie_id: link.movie_id,
            created_at: now,
            updated_at: now,
        };
        tables.category_movies.push(link.clone());
        Ok(link)
    }

    async fn update(
        &self,
        changes: CategoryMovieChanges,
        id: Uuid,
    ) -> Result<Option<CategoryMovie>, AppError> {
        self.check_writable()?;
        if changes.is_empty() {
            return Ok(None);
        }
        let mut tables = self.lock();
        let Some(link) = tables.category_movies.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(category_id) = changes.category_id {
            link.category_id = category_id;
        }
        if let Some(movie_id) = changes.movie_id {
            link.movie_id = movie_id;
        }
        link.updated_at = Utc::now();
        Ok(Some(link.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_writable()?;
        let mut tables = self.lock();
        let before = tables.category_movies.len();
        tables.category_movies.retain(|l| l.id != id);
        Ok(tables.category_movies.len() < before)
    }

    async fn exists(&self, category_id: Uuid, movie_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .lock()
            .category_movies
            .iter()
            .any(|l| l.category_id == category_id && l.movie_id == movie_id))
    }
}

macro_rules! impl_repositories {
    ($ty:ty, $field:ident) => {
        impl Repositories for $ty {
            fn categories(&self) -> &dyn CategoryRepository {
                &self.$field
            }

            fn movies(&self) -> &dyn MovieRepository {
                &self.$field
            }

            fn medias(&self) -> &dyn MediaRepository {
                &self.$field
            }

            fn category_movies(&self) -> &dyn CategoryMovieRepository {
                &self.$field
            }
        }
    };
}

/// In-memory `Catalog`
#[derive(Clone)]
pub struct MemoryCatalog {
    shared: MemoryTables,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            shared: MemoryTables {
                tables: Arc::new(Mutex::new(Tables::default())),
                fail_writes: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Make every subsequent write fail with an internal error
    pub fn fail_writes(&self, fail: bool) {
        self.shared.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn movie_count(&self) -> usize {
        self.shared.lock().movies.len()
    }

    pub fn media_count(&self) -> usize {
        self.shared.lock().medias.len()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl_repositories!(MemoryCatalog, shared);

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn begin(&self) -> Result<Box<dyn CatalogTransaction>, AppError> {
        let snapshot = self.shared.lock().clone();
        Ok(Box::new(MemoryTransaction {
            parent: self.shared.clone(),
            working: MemoryTables {
                tables: Arc::new(Mutex::new(snapshot)),
                fail_writes: self.shared.fail_writes.clone(),
            },
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

struct MemoryTransaction {
    parent: MemoryTables,
    working: MemoryTables,
}

impl_repositories!(MemoryTransaction, working);

#[async_trait]
impl CatalogTransaction for MemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let working = self.working.lock().clone();
        *self.parent.lock() = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}
