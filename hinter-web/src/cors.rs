//! CORS headers for the public suggest endpoint.

use actix_web::{
    http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    },
    middleware::DefaultHeaders,
};

/// Middleware that adds CORS headers to every response of the wrapped
/// service, including error responses. Headers already set, for example by
/// the app-wide [`actix_cors::Cors`] middleware for a specific origin, are
/// left alone.
pub fn headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add((ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((ACCESS_CONTROL_ALLOW_METHODS, "GET, OPTIONS"))
        .add((ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}
