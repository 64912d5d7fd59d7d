//! The reminder creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    extract::ApiJson,
    reminder::{ReminderForm, db::create_reminder},
};

/// The state needed for creating a reminder.
#[derive(Debug, Clone)]
pub struct CreateReminderState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateReminderState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a reminder, responds with 201 and the reminder.
pub async fn create_reminder_endpoint(
    State(state): State<CreateReminderState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<ReminderForm>,
) -> Result<Response, Error> {
    let new_reminder = form.validate()?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let reminder = create_reminder(user_id, &new_reminder, &connection)?;

    Ok((StatusCode::CREATED, Json(reminder)).into_response())
}
