//! HTTP handlers, one module per resource.
//!
//! Reads go straight to the pool-bound repositories. Writes open a catalog
//! transaction, and every failure after `begin` goes through
//! [`rollback`](crate::response::rollback).

pub mod categories;
pub mod category_movies;
pub mod medias;
pub mod movies;

use axum::{http::StatusCode, response::Response};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::response::send_response;

/// `?query=` of the search endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring to look for
    pub query: Option<String>,
}

impl SearchQuery {
    /// The trimmed query, `None` when missing or blank
    pub fn term(&self) -> Option<&str> {
        self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }
}

/// Path ids arrive as strings so a malformed id answers 404 like an unknown one.
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

pub(crate) fn not_found(message: &str) -> Response {
    send_response::<()>(None, Some(message), StatusCode::NOT_FOUND)
}
