//! Cinetheque Core Library
//!
//! This crate provides the domain models, error types, pagination primitives and
//! configuration shared by every Cinetheque component.

pub mod config;
pub mod error;
pub mod models;
pub mod pagination;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel, GENERIC_FAILURE_MESSAGE};
pub use pagination::{
    PageEnvelope, PageQuery, PageRequest, Paginated, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
