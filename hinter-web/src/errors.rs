//! Any errors that hinter-web might generate, and supporting implementations.

use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// No route matched the request path.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A response payload could not be written as JSON.
    #[error("Could not serialize the response")]
    Serialization(#[source] serde_json::Error),
}

/// The body of every error response.
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    /// A short, human readable description of the error.
    error: String,
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            error: self.to_string(),
        })
    }
}

/// Fallback for requests that no route matched.
pub async fn not_found(request: HttpRequest) -> Result<HttpResponse, HandlerError> {
    Err(HandlerError::NotFound(request.path().to_string()))
}
