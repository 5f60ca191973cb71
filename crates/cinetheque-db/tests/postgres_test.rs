//! PostgreSQL catalog integration tests.
//!
//! Each test starts its own Postgres container and applies the workspace
//! migrations. Run with: `cargo test -p cinetheque-db --test postgres_test`
//! (needs a Docker daemon; tests return early when none is reachable).

use chrono::NaiveDate;
use cinetheque_core::models::{
    CategoryMovieChanges, MediaType, MediaUpsert, MovieChanges, NewCategory, NewCategoryMovie,
    NewMovie,
};
use cinetheque_core::PageRequest;
use cinetheque_db::{Catalog, PgCatalog, Repositories};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

struct TestDb {
    catalog: PgCatalog,
    _container: ContainerAsync<Postgres>,
}

async fn setup_test_db() -> Option<TestDb> {
    let container = match Postgres::default().start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("skipping: cannot start postgres container: {}", e);
            return None;
        }
    };

    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");
    let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&connection_string)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb {
        catalog: PgCatalog::new(pool),
        _container: container,
    })
}

fn new_movie(name: &str, description: &str) -> NewMovie {
    NewMovie {
        name: name.to_string(),
        description: description.to_string(),
        release_date: NaiveDate::from_ymd_opt(2021, 9, 15).unwrap(),
        rate: 8,
        duration: 155,
        media_id: None,
    }
}

fn poster(path: &str) -> MediaUpsert {
    MediaUpsert {
        media_path: Some(path.to_string()),
        media_url: Some(format!("http://localhost:4000/storage/{}", path)),
        media_type: MediaType::Poster,
    }
}

#[tokio::test]
async fn movie_round_trip_and_delete() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let movies = db.catalog.movies();

    let created = movies.store(new_movie("Dune", "Spice")).await.unwrap();
    let fetched = movies.get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Dune");
    assert_eq!(fetched.release_date, NaiveDate::from_ymd_opt(2021, 9, 15).unwrap());
    assert_eq!(fetched.media, None);

    assert!(movies.delete(created.id).await.unwrap());
    assert!(movies.get_by_id(created.id).await.unwrap().is_none());
    assert!(!movies.delete(created.id).await.unwrap());
}

#[tokio::test]
async fn index_respects_page_size_and_total() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    for i in 0..12 {
        db.catalog
            .movies()
            .store(new_movie(&format!("Movie {}", i), "desc"))
            .await
            .unwrap();
    }

    let first = db
        .catalog
        .movies()
        .index(PageRequest::new(Some(5), Some(1)))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.total, 12);
    assert_eq!(first.last_page(), 3);
    assert_eq!(first.items[0].name, "Movie 0");

    let last = db
        .catalog
        .movies()
        .index(PageRequest::new(Some(5), Some(3)))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 2);
}

#[tokio::test]
async fn search_is_case_insensitive_and_literal() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let movies = db.catalog.movies();
    movies.store(new_movie("100% Wolf", "A werewolf")).await.unwrap();
    movies.store(new_movie("1000 Wolves", "Pack")).await.unwrap();
    movies.store(new_movie("Heat", "Crime on_the run")).await.unwrap();

    let wolves = movies.search("WOLF").await.unwrap();
    assert_eq!(wolves.len(), 2);

    let percent = movies.search("100%").await.unwrap();
    assert_eq!(percent.len(), 1);
    assert_eq!(percent[0].name, "100% Wolf");

    let underscore = movies.search("on_the").await.unwrap();
    assert_eq!(underscore.len(), 1);
    assert_eq!(underscore[0].name, "Heat");

    assert!(movies.search("matrix").await.unwrap().is_empty());

    db.catalog
        .categories()
        .store(NewCategory {
            name: "Science Fiction".to_string(),
        })
        .await
        .unwrap();
    let found = db.catalog.categories().search("fiction").await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(db
        .catalog
        .categories()
        .find_by_name("science fiction")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn partial_update_touches_only_supplied_fields() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let movies = db.catalog.movies();
    let media = db.catalog.medias().store(poster("poster/a.jpg")).await.unwrap();
    let mut movie = new_movie("Dune", "Spice");
    movie.media_id = Some(media.id);
    let created = movies.store(movie).await.unwrap();
    assert_eq!(created.media.as_ref().map(|m| m.media_type), Some(MediaType::Poster));

    let updated = movies
        .update(
            MovieChanges {
                rate: Some(9),
                ..Default::default()
            },
            created.id,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.rate, 9);
    assert_eq!(updated.name, "Dune");
    assert_eq!(updated.media_id, Some(media.id));

    let cleared = movies
        .update(
            MovieChanges {
                media_id: Some(None),
                ..Default::default()
            },
            created.id,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.media_id, None);
    assert_eq!(cleared.rate, 9);

    assert!(movies
        .update(MovieChanges::default(), created.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn media_upsert_keeps_id_and_delete_detaches_movie() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let medias = db.catalog.medias();
    let media = medias.store(poster("poster/a.jpg")).await.unwrap();
    let mut movie = new_movie("Dune", "Spice");
    movie.media_id = Some(media.id);
    let movie = db.catalog.movies().store(movie).await.unwrap();

    let replaced = medias
        .store_or_update(poster("poster/b.jpg"), Some(media.id))
        .await
        .unwrap();
    assert_eq!(replaced.id, media.id);
    assert_eq!(replaced.media_path.as_deref(), Some("poster/b.jpg"));

    assert!(medias.delete(media.id).await.unwrap());
    let movie = db.catalog.movies().get_by_id(movie.id).await.unwrap().unwrap();
    assert_eq!(movie.media_id, None);
    assert_eq!(movie.media, None);
}

#[tokio::test]
async fn links_cascade_and_stay_unique() {
    let Some(db) = setup_test_db().await else {
        return;
    };
    let drama = db
        .catalog
        .categories()
        .store(NewCategory {
            name: "Drama".to_string(),
        })
        .await
        .unwrap();
    let comedy = db
        .catalog
        .categories()
        .store(NewCategory {
            name: "Comedy".to_string(),
        })
        .await
        .unwrap();
    let movie = db.catalog.movies().store(new_movie("Heat", "Crime")).await.unwrap();

    let links = db.catalog.category_movies();
    links
        .store(NewCategoryMovie {
            category_id: drama.id,
            movie_id: movie.id,
        })
        .await
        .unwrap();
    let comedy_link = links
        .store(NewCategoryMovie {
            category_id: comedy.id,
            movie_id: movie.id,
        })
        .await
        .unwrap();
    assert!(links.exists(drama.id, movie.id).await.unwrap());

    let duplicate = links
        .update(
            CategoryMovieChanges {
                category_id: Some(drama.id),
                movie_id: None,
            },
            comedy_link.id,
        )
        .await;
    assert!(duplicate.is_err());

    assert!(db.catalog.categories().delete(drama.id).await.unwrap());
    assert!(!links.exists(drama.id, movie.id).await.unwrap());

    assert!(db.catalog.movies().delete(movie.id).await.unwrap());
    assert!(links.get_by_id(comedy_link.id).await.unwrap().is_none());
}

#[tokio::test]
async fn rollback_discards_writes_and_commit_keeps_them() {
    let Some(db) = setup_test_db().await else {
        return;
    };

    let tx = db.catalog.begin().await.unwrap();
    let media = tx.medias().store(poster("poster/a.jpg")).await.unwrap();
    let mut movie = new_movie("Dune", "Spice");
    movie.media_id = Some(media.id);
    let discarded = tx.movies().store(movie).await.unwrap();
    tx.rollback().await.unwrap();

    assert!(db.catalog.movies().get_by_id(discarded.id).await.unwrap().is_none());
    assert!(db.catalog.medias().get_by_id(media.id).await.unwrap().is_none());

    let tx = db.catalog.begin().await.unwrap();
    let kept = tx.movies().store(new_movie("Heat", "Crime")).await.unwrap();
    tx.commit().await.unwrap();

    assert!(db.catalog.movies().get_by_id(kept.id).await.unwrap().is_some());
    db.catalog.ping().await.unwrap();
}
