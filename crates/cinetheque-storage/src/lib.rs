//! Cinetheque Storage Library
//!
//! Storage abstraction for uploaded media files and its local filesystem
//! implementation (the "public disk" served under `/storage`).
//!
//! # Storage key format
//!
//! Keys are relative paths such as `poster/{uuid}.jpg`: the first segment is the
//! media type, the rest a generated file name. Keys must not contain `..` or a
//! leading `/`.

pub mod factory;
pub mod local;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
