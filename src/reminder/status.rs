//! Endpoints for marking a reminder as read and deleting it.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::ReminderId,
    reminder::db::{delete_reminder, set_reminder_read},
};

/// The state needed for changing a single reminder.
#[derive(Debug, Clone)]
pub struct ReminderStatusState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReminderStatusState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for marking one of the user's reminders as read.
pub async fn mark_reminder_read_endpoint(
    State(state): State<ReminderStatusState>,
    Extension(user_id): Extension<UserID>,
    Path(reminder_id): Path<ReminderId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    set_reminder_read(user_id, reminder_id, true, &connection)?;

    Ok(Json(json!({ "message": "Reminder marked as read" })))
}

/// A route handler for deleting one of the user's reminders.
pub async fn delete_reminder_endpoint(
    State(state): State<ReminderStatusState>,
    Extension(user_id): Extension<UserID>,
    Path(reminder_id): Path<ReminderId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_reminder(user_id, reminder_id, &connection)?;

    Ok(Json(json!({ "message": "Reminder deleted" })))
}
