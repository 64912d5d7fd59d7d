//! The fallback handler for unknown routes.

use axum::{
    http::Uri,
    response::{IntoResponse, Response},
};

use crate::Error;

/// Respond to a request for a route that does not exist with a JSON 404.
pub async fn get_404_not_found(uri: Uri) -> Response {
    tracing::debug!("No route for {uri}");

    Error::NotFound.into_response()
}
