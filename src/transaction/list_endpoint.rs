//! Defines the endpoint for listing a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    extract::ApiQuery,
    transaction::{Transaction, TransactionType, core::get_transactions},
};

/// The state needed to list transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Only list transactions of this type.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
}

/// List the user's transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<TransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_transactions(user_id, query.transaction_type, &connection).map(Json)
}
