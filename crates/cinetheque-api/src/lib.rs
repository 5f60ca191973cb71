//! Cinetheque API Library
//!
//! HTTP handlers for the movie catalog, the response envelope, the poster
//! uploader, and application setup.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod resources;
pub mod response;
pub mod services;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use response::ApiResponse;
pub use state::AppState;
