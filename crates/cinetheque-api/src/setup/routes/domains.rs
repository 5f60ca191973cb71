//! Resource route groups

use crate::constants::API_PREFIX;
use crate::handlers::{categories, category_movies, medias, movies};
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub fn movie_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/movies", API_PREFIX),
            get(movies::index).post(movies::store),
        )
        .route(&format!("{}/movies/search", API_PREFIX), get(movies::search))
        .route(
            &format!("{}/movies/{{id}}", API_PREFIX),
            get(movies::show).put(movies::update).delete(movies::destroy),
        )
}

pub fn category_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/categories", API_PREFIX),
            get(categories::index).post(categories::store),
        )
        .route(
            &format!("{}/categories/search", API_PREFIX),
            get(categories::search),
        )
        .route(
            &format!("{}/categories/{{id}}", API_PREFIX),
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
}

pub fn media_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/medias", API_PREFIX), get(medias::index))
        .route(
            &format!("{}/medias/{{id}}", API_PREFIX),
            get(medias::show).delete(medias::destroy),
        )
}

pub fn category_movie_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/category-movies", API_PREFIX),
            get(category_movies::index).post(category_movies::store),
        )
        .route(
            &format!("{}/category-movies/{{id}}", API_PREFIX),
            get(category_movies::show)
                .put(category_movies::update)
                .delete(category_movies::destroy),
        )
}
