//! Route prefixes shared by the router and the OpenAPI document

/// API base path prefix
pub const API_PREFIX: &str = "/api";

/// Path the public disk is served from
pub const STORAGE_ROUTE: &str = "/storage";

/// OpenAPI document route
pub const OPENAPI_ROUTE: &str = "/api/openapi.json";

pub const MISSING_QUERY_MESSAGE: &str = "Invalid query, missing query parameter {query}";

pub const UNPROCESSABLE_MESSAGE: &str = "Unable to process the request";
