//! The wrapper every successful response body is written in.

use crate::errors::HandlerError;
use actix_web::{http::header::ContentType, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

/// `{"data": <payload>}`
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    /// The payload of the response.
    pub data: T,
}

/// Finish `builder` with `payload` wrapped in a [`SuccessEnvelope`].
///
/// # Errors
/// If `payload` cannot be serialized as JSON.
pub fn write_success<T: Serialize>(
    mut builder: HttpResponseBuilder,
    payload: T,
) -> Result<HttpResponse, HandlerError> {
    let body = serde_json::to_string(&SuccessEnvelope { data: payload }).map_err(|error| {
        tracing::error!(%error, r#type = "web.envelope.error", "Could not serialize response");
        HandlerError::Serialization(error)
    })?;

    Ok(builder.content_type(ContentType::json()).body(body))
}
