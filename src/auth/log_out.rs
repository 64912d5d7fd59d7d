//! Handles log-out requests.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie and confirm the log out.
///
/// Logging out without a session is not an error.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Json(json!({ "message": "Logged out successfully" }))).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{Router, extract::FromRef, routing::get};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::auth::{cookie::COOKIE_TOKEN, log_out::get_log_out};

    #[derive(Clone)]
    struct TestState {
        cookie_key: Key,
    }

    impl FromRef<TestState> for Key {
        fn from_ref(state: &TestState) -> Self {
            state.cookie_key.clone()
        }
    }

    #[tokio::test]
    async fn log_out_invalidates_auth_cookie() {
        let app = Router::new()
            .route("/log_out", get(get_log_out))
            .with_state(TestState {
                cookie_key: Key::from(&Sha512::digest(b"foobar")),
            });
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server.get("/log_out").await;

        response.assert_status_ok();
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(
            response.json::<serde_json::Value>()["message"],
            "Logged out successfully"
        );
    }
}
