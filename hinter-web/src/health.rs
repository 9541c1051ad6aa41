//! Liveness check for load balancers and orchestration.

use actix_web::{get, web::ServiceConfig, HttpResponse};

use crate::{envelope::write_success, errors::HandlerError};

/// Handles the health check endpoint.
pub fn configure(config: &mut ServiceConfig) {
    config.service(health);
}

/// Used to indicate that the server can respond to requests. Always OK.
#[get("/health")]
async fn health() -> Result<HttpResponse, HandlerError> {
    write_success(HttpResponse::Ok(), "OK")
}
