//! Helpers shared by the unit tests.

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState,
    auth::{
        COOKIE_TOKEN, NewUser, PasswordHash, User, ValidatedPassword, create_user, parse_email,
    },
    build_router,
    db::initialize,
    endpoints,
};

pub(crate) const TEST_EMAIL: &str = "test@example.com";
pub(crate) const TEST_PASSWORD: &str = "turkeysgogobblegobble";

/// An in-memory database with every table created.
#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");
    connection
}

/// Insert a user with the email [TEST_EMAIL] and password [TEST_PASSWORD].
#[track_caller]
pub(crate) fn create_test_user(connection: &Connection) -> User {
    create_user_with_email(TEST_EMAIL, connection)
}

#[track_caller]
pub(crate) fn create_user_with_email(email: &str, connection: &Connection) -> User {
    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: parse_email(email).expect("Invalid test email"),
            password_hash: PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
                .expect("Could not hash password"),
        },
        connection,
    )
    .expect("Could not create test user")
}

/// App state backed by an in-memory database, with a cheap password hash cost.
pub(crate) fn get_test_app_state() -> AppState {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    let mut state =
        AppState::new(connection, "foobar", "Etc/UTC").expect("Could not create app state.");
    state.password_hash_cost = 4;
    state
}

/// A test server for the full router along with the auth cookie of a
/// logged-in user and the app state, so tests can seed the database.
pub(crate) async fn get_logged_in_server() -> (TestServer, Cookie<'static>, AppState, User) {
    let state = get_test_app_state();
    let user = {
        let connection = state.db_connection.lock().expect("Could not lock database");
        create_test_user(&connection)
    };
    let server =
        TestServer::new(build_router(state.clone())).expect("Could not create test server.");

    let response = server
        .post(endpoints::LOG_IN_API)
        .json(&json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();
    let auth_cookie = response.cookie(COOKIE_TOKEN);

    (server, auth_cookie, state, user)
}
