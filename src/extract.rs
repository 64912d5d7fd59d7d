//! Request extractors that report malformed input as [Error::Validation].

use axum::extract::{FromRequest, FromRequestParts, rejection::QueryRejection};

use crate::Error;

/// JSON body extractor whose rejection is a JSON [Error::Validation] response
/// instead of axum's plain text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejection is a JSON [Error::Validation] response.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}
