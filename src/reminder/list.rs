//! Endpoints that list reminders: all active ones, today's, and exceeded
//! spending limits.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    reminder::{
        Reminder, SpendingLimitAlert, db::get_active_reminders, due_today_sweep,
        spending_limit_evaluation,
    },
    timezone::get_local_today,
};

/// The state needed for listing reminders.
#[derive(Debug, Clone)]
pub struct ListRemindersState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListRemindersState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's active reminders.
pub async fn list_reminders_endpoint(
    State(state): State<ListRemindersState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Reminder>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_active_reminders(user_id, &connection).map(Json)
}

/// Fire the reminders due today and list every reminder that fired today.
pub async fn get_today_reminders_endpoint(
    State(state): State<ListRemindersState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Reminder>>, Error> {
    let today = get_local_today(&state.local_timezone)?;

    let mut connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = connection.transaction()?;
    let fired = due_today_sweep(user_id, today, &transaction)?;
    transaction.commit()?;

    Ok(Json(fired))
}

/// List the spending limits that this month's expenses have gone over.
pub async fn get_spending_alerts_endpoint(
    State(state): State<ListRemindersState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<SpendingLimitAlert>>, Error> {
    let today = get_local_today(&state.local_timezone)?;

    let mut connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = connection.transaction()?;
    let alerts = spending_limit_evaluation(user_id, today, &transaction)?;
    transaction.commit()?;

    Ok(Json(alerts))
}
