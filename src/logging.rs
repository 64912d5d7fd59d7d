//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{header::CONTENT_TYPE, request, response},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in JSON request bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body(body).await {
        Ok(body_text) => body_text,
        Err(error) => return error.into_response(),
    };

    if is_json(&parts) {
        log_request(&parts, &redact_passwords(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body(body).await {
        Ok(body_text) => body_text,
        Err(error) => return error.into_response(),
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn read_body(body: Body) -> Result<String, Error> {
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|error| Error::Validation(format!("could not read body: {error}")))?;

    Ok(String::from_utf8_lossy(&body_bytes).into_owned())
}

fn is_json(parts: &request::Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"))
}

/// Replace the value of every field whose name contains "password".
///
/// Text that is not valid JSON is returned unchanged.
fn redact_passwords(json_text: &str) -> String {
    match serde_json::from_str::<Value>(json_text) {
        Ok(mut value) => {
            redact_value(&mut value);
            value.to_string()
        }
        Err(_) => json_text.to_owned(),
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(fields) => {
            for (name, field) in fields.iter_mut() {
                if name.to_lowercase().contains("password") {
                    *field = Value::String(REDACTED.to_owned());
                } else {
                    redact_value(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if the
/// body fits.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Received request: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {truncated}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::logging::{
        LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_passwords, truncate,
    };

    #[test]
    fn redacts_nested_password_fields() {
        let body = json!({
            "email": "test@example.com",
            "password": "hunter2",
            "nested": { "newPassword": "hunter3" }
        })
        .to_string();

        let redacted: Value = serde_json::from_str(&redact_passwords(&body)).unwrap();

        assert_eq!(redacted["email"], "test@example.com");
        assert_eq!(redacted["password"], "********");
        assert_eq!(redacted["nested"]["newPassword"], "********");
    }

    #[test]
    fn leaves_non_json_alone() {
        assert_eq!(redact_passwords("password=hunter2"), "password=hunter2");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let short = "a".repeat(LOG_BODY_LENGTH_LIMIT);
        let long = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        assert_eq!(truncate(&short), None);
        assert_eq!(
            truncate(&long).map(|text| text.chars().count()),
            Some(LOG_BODY_LENGTH_LIMIT)
        );
    }

    #[tokio::test]
    async fn passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(|body: String| async move { body }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).unwrap();

        let response = server.post("/echo").json(&json!({ "password": "hunter2" })).await;

        response.assert_status_ok();
        assert_eq!(response.text(), r#"{"password":"hunter2"}"#);
    }
}
