//! Cinetheque Infrastructure Library
//!
//! Shared plumbing for the Cinetheque binaries:
//! - Telemetry initialization (tracing subscriber)
//! - Request ID middleware

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{get_request_id, request_id_middleware, request_span, RequestId, REQUEST_ID_HEADER};
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};
