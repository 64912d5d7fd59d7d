//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, Error, auth::UserID, database_id::TransactionId,
    transaction::core::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the user's transactions.
///
/// Budget spending is not adjusted here, the analytics recalculate it from
/// the remaining transactions.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(user_id, transaction_id, &connection)?;

    Ok(Json(json!({ "message": "Transaction deleted" })))
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, endpoints::format_endpoint, test_utils::get_logged_in_server};

    #[tokio::test]
    async fn deletes_own_transaction() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        let created: Value = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({
                "transactionType": "expense",
                "amount": 1,
                "date": "2024-03-01",
                "category": "Food"
            }))
            .await
            .json();
        let id = created["transaction"]["id"].as_i64().unwrap();

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, id))
            .add_cookie(auth_cookie.clone())
            .await;

        response.assert_status_ok();
        let remaining: Vec<Value> = server
            .get(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie)
            .await
            .json();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_transaction_is_not_found() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .delete(&format_endpoint(endpoints::TRANSACTION, 1234))
            .add_cookie(auth_cookie)
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
