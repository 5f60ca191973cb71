//! Movie API integration tests.
//!
//! Run with: `cargo test -p cinetheque-api --test movies_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{api_path, create_movie, movie_body, poster_bytes, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn store_movie_without_poster() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/movies"))
        .json(&movie_body("Dune"))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Movie created successfully");
    assert_eq!(body["data"]["name"], "Dune");
    assert_eq!(body["data"]["release_date"], "2021-09-15");
    assert!(body["data"]["media"].is_null());
    assert_eq!(app.catalog.media_count(), 0);
}

#[tokio::test]
async fn store_movie_reports_missing_fields() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/movies"))
        .json(&json!({ "name": "Dune" }))
        .await;

    assert_eq!(response.status_code(), 422);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert_eq!(
        body["message"],
        "The description field is required. The release_date field is required."
    );
    assert_eq!(app.catalog.movie_count(), 0);
}

#[tokio::test]
async fn store_movie_with_poster_upload() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_text("name", "Arrival")
        .add_text("description", "Heptapods land.")
        .add_text("release_date", "2016-11-11")
        .add_text("rate", "5")
        .add_part(
            "media",
            Part::bytes(poster_bytes())
                .file_name("arrival.png")
                .mime_type("image/png"),
        );

    let response = app.client().post(&api_path("/movies")).multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    let media = &body["data"]["media"];
    assert_eq!(media["media_type"], "poster");

    let path = media["media_path"].as_str().unwrap();
    assert!(path.starts_with("poster/"));
    assert!(path.ends_with(".png"));
    assert_eq!(
        media["media_url"],
        format!("{}/{}", helpers::PUBLIC_BASE_URL, path)
    );
    assert!(app.stored_file(path).exists());
    assert_eq!(body["data"]["duration"], 0);
}

#[tokio::test]
async fn update_replaces_poster_and_keeps_media_id() {
    let app = setup_test_app().await;

    let first = MultipartForm::new()
        .add_text("name", "Alien")
        .add_text("description", "In space no one can hear you scream.")
        .add_text("release_date", "1979-05-25")
        .add_part("media", Part::bytes(poster_bytes()).file_name("alien.png"));
    let created: Value = app
        .client()
        .post(&api_path("/movies"))
        .multipart(first)
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let media_id = created["data"]["media"]["id"].clone();
    let old_path = created["data"]["media"]["media_path"]
        .as_str()
        .unwrap()
        .to_string();

    let second = MultipartForm::new()
        .add_text("rate", "5")
        .add_part("media", Part::bytes(poster_bytes()).file_name("alien-4k.jpg"));
    let response = app
        .client()
        .put(&api_path(&format!("/movies/{}", id)))
        .multipart(second)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Movie updated successfully");
    assert_eq!(body["data"]["rate"], 5);
    assert_eq!(body["data"]["name"], "Alien");
    assert_eq!(body["data"]["media"]["id"], media_id);

    let new_path = body["data"]["media"]["media_path"].as_str().unwrap();
    assert_ne!(new_path, old_path);
    assert!(new_path.ends_with(".jpg"));
    assert!(app.stored_file(new_path).exists());
    assert!(!app.stored_file(&old_path).exists());
    assert_eq!(app.catalog.media_count(), 1);
}

#[tokio::test]
async fn update_without_changes_is_unprocessable() {
    let app = setup_test_app().await;
    let movie = create_movie(app.client(), "Heat").await;

    let response = app
        .client()
        .put(&api_path(&format!("/movies/{}", movie["id"].as_str().unwrap())))
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), 422);
    assert_eq!(response.json::<Value>()["message"], "Unable to process the request");
}

#[tokio::test]
async fn index_paginates_with_per_page() {
    let app = setup_test_app().await;
    for n in 0..12 {
        create_movie(app.client(), &format!("Movie {}", n)).await;
    }

    let response = app
        .client()
        .get(&api_path("/movies"))
        .add_query_param("perPage", 5)
        .await;

    assert_eq!(response.status_code(), 200);
    let data = response.json::<Value>()["data"].clone();
    assert_eq!(data["items"].as_array().unwrap().len(), 5);
    assert_eq!(data["total"], 12);
    assert_eq!(data["per_page"], 5);
    assert_eq!(data["current_page"], 1);
    assert_eq!(data["last_page"], 3);

    let last: Value = app
        .client()
        .get(&api_path("/movies"))
        .add_query_param("perPage", 5)
        .add_query_param("page", 3)
        .await
        .json();
    assert_eq!(last["data"]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn index_of_empty_catalog() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/movies")).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "No movies found");
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn show_unknown_and_malformed_ids() {
    let app = setup_test_app().await;

    let unknown = app
        .client()
        .get(&api_path("/movies/3f1c2a9e-6a4b-4a83-9a49-8d7f3c1a2b10"))
        .await;
    assert_eq!(unknown.status_code(), 404);
    assert_eq!(unknown.json::<Value>()["message"], "Movie not found");

    let malformed = app.client().get(&api_path("/movies/42")).await;
    assert_eq!(malformed.status_code(), 404);
}

#[tokio::test]
async fn search_requires_query() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/movies/search")).await;

    assert_eq!(response.status_code(), 422);
    assert_eq!(
        response.json::<Value>()["message"],
        "Invalid query, missing query parameter {query}"
    );
}

#[tokio::test]
async fn search_matches_name_and_description() {
    let app = setup_test_app().await;
    create_movie(app.client(), "Blade Runner").await;
    create_movie(app.client(), "Alien").await;

    let found: Value = app
        .client()
        .get(&api_path("/movies/search"))
        .add_query_param("query", "blade")
        .await
        .json();
    assert_eq!(found["data"].as_array().unwrap().len(), 1);
    assert_eq!(found["data"][0]["name"], "Blade Runner");

    let missing = app
        .client()
        .get(&api_path("/movies/search"))
        .add_query_param("query", "zzz")
        .await;
    assert_eq!(missing.status_code(), 404);
    assert_eq!(missing.json::<Value>()["message"], "No movies found");
}

#[tokio::test]
async fn destroy_movie() {
    let app = setup_test_app().await;
    let movie = create_movie(app.client(), "Tenet").await;
    let path = api_path(&format!("/movies/{}", movie["id"].as_str().unwrap()));

    let response = app.client().delete(&path).await;
    assert_eq!(response.status_code(), 204);
    assert_eq!(app.catalog.movie_count(), 0);

    let again = app.client().delete(&path).await;
    assert_eq!(again.status_code(), 404);
    assert_eq!(again.json::<Value>()["message"], "Movie not found");
}

#[tokio::test]
async fn failed_write_rolls_back_with_generic_message() {
    let app = setup_test_app().await;
    app.catalog.fail_writes(true);

    let response = app
        .client()
        .post(&api_path("/movies"))
        .json(&movie_body("Solaris"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Something went wrong! Process not completed");

    app.catalog.fail_writes(false);
    assert_eq!(app.catalog.movie_count(), 0);
}

#[tokio::test]
async fn failed_write_discards_uploaded_poster() {
    let app = setup_test_app().await;
    app.catalog.fail_writes(true);

    let form = MultipartForm::new()
        .add_text("name", "Stalker")
        .add_text("description", "The Zone.")
        .add_text("release_date", "1979-05-25")
        .add_part("media", Part::bytes(poster_bytes()).file_name("stalker.png"));
    let response = app.client().post(&api_path("/movies")).multipart(form).await;

    assert_eq!(response.status_code(), 500);
    let posters = app.stored_file("poster");
    let leftover = std::fs::read_dir(&posters)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);
}
