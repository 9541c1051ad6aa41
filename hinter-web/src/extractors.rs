//! Types to extract hinter data from requests.

use actix_web::{dev::Payload, Error as ActixError, FromRequest, HttpRequest};
use futures_util::future::{self, Ready};
use hinter_suggest::QueryValues;

/// An extractor for the decoded query string of a request, keeping repeated
/// keys.
///
/// Unlike `web::Query`, this never rejects a request.
pub struct QueryValuesWrapper(pub QueryValues);

impl FromRequest for QueryValuesWrapper {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        future::ready(Ok(Self(QueryValues::parse(req.query_string()))))
    }
}
