//! Handles user registration and the current user lookup.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::{
        PasswordHash, User, UserID, ValidatedPassword,
        user::{NewUser, create_user, get_user_by_id, parse_email, parse_name},
    },
    extract::ApiJson,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost used when hashing new passwords.
    pub password_hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data sent by the client to register an account.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Create a user from the registration details and return it with status 201.
///
/// # Errors
///
/// Returns an:
/// - [Error::Validation] if the name is blank or the email is invalid,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email is already registered.
pub async fn register_user(
    State(state): State<RegistrationState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<Response, Error> {
    let name = parse_name(&form.name)?;
    let email = parse_email(&form.email)?;
    let password = ValidatedPassword::new(&form.password, &[&name, email.as_str()])?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let user = create_user(
        NewUser {
            name,
            email,
            password_hash,
        },
        &connection,
    )?;

    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

/// Return the logged-in user.
pub async fn get_current_user(
    State(state): State<RegistrationState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<User>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(user_id, &connection).map(Json)
}
