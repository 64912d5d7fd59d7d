//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{BudgetAlert, apply_expense},
    extract::ApiJson,
    timezone::get_local_today,
    transaction::{
        NewTransaction, Transaction, TransactionDetails, core::create_transaction,
        form::TransactionForm,
    },
};

/// The state needed to record a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedTransaction {
    message: &'static str,
    transaction: Transaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget_alert: Option<BudgetAlert>,
}

/// Store a transaction and, for expenses, count it against the matching budget.
///
/// Both happen in one database transaction so a failure leaves neither
/// behind.
///
/// # Errors
///
/// Returns an [Error::SqlError] if either write fails.
pub fn record_transaction(
    user_id: UserID,
    new_transaction: &NewTransaction,
    connection: &mut Connection,
) -> Result<(Transaction, Option<BudgetAlert>), Error> {
    let sql_transaction = connection.transaction()?;

    let transaction = create_transaction(user_id, new_transaction, &sql_transaction)?;
    let budget_alert = match &transaction.details {
        TransactionDetails::Expense { category, .. } => apply_expense(
            user_id,
            *category,
            transaction.amount,
            transaction.date,
            &sql_transaction,
        )?,
        TransactionDetails::Income { .. } => None,
    };

    sql_transaction.commit()?;

    Ok((transaction, budget_alert))
}

/// A route handler for recording a new transaction.
///
/// Responds with 201, the stored transaction and the budget alert raised by
/// the expense, if any.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Response, Error> {
    let today = get_local_today(&state.local_timezone)?;
    let new_transaction = form.validate(today)?;

    let mut connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let (transaction, budget_alert) =
        record_transaction(user_id, &new_transaction, &mut connection)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedTransaction {
            message: "Transaction added",
            transaction,
            budget_alert,
        }),
    )
        .into_response())
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, test_utils::get_logged_in_server};

    #[tokio::test]
    async fn records_expense_without_budget() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie)
            .json(&json!({
                "transactionType": "expense",
                "amount": 42.5,
                "date": "2024-03-15",
                "category": "Shopping",
                "description": "Shoes"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Transaction added");
        assert_eq!(body["transaction"]["amount"], 42.5);
        assert_eq!(body["transaction"]["week"], 3);
        assert_eq!(body["transaction"]["month"], 3);
        assert_eq!(body["transaction"]["year"], 2024);
        assert!(body.get("budgetAlert").is_none());
    }

    #[tokio::test]
    async fn expense_updates_budget_and_returns_alert() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        server
            .post(endpoints::BUDGETS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({ "category": "Food", "budgetAmount": 1000, "month": 3, "year": 2024 }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({
                "transactionType": "expense",
                "amount": 850,
                "date": "2024-03-15",
                "category": "Food"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["budgetAlert"]["type"], "warning");
        assert_eq!(body["budgetAlert"]["message"], "Food budget is 85.0% used");

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({
                "transactionType": "expense",
                "amount": 300,
                "date": "2024-03-16",
                "category": "Food"
            }))
            .await;

        let body: Value = response.json();
        assert_eq!(body["budgetAlert"]["type"], "error");
        assert_eq!(body["budgetAlert"]["exceededAmount"], 150.0);

        let budgets: Vec<Value> = server
            .get(endpoints::BUDGETS)
            .add_query_param("month", 3)
            .add_query_param("year", 2024)
            .add_cookie(auth_cookie)
            .await
            .json();
        assert_eq!(budgets[0]["spentAmount"], 1150.0);
        assert_eq!(budgets[0]["remainingAmount"], 0.0);
        assert_eq!(budgets[0]["isExceeded"], true);
    }

    #[tokio::test]
    async fn income_never_touches_budgets() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        server
            .post(endpoints::BUDGETS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({ "category": "Food", "budgetAmount": 10, "month": 3, "year": 2024 }))
            .await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({
                "transactionType": "income",
                "amount": 5000,
                "date": "2024-03-01",
                "source": "Employer",
                "incomeType": "Salary"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["transaction"]["incomeType"], "Salary");
        assert!(body.get("budgetAlert").is_none());
    }

    #[tokio::test]
    async fn invalid_transaction_is_rejected() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie)
            .json(&json!({ "transactionType": "expense", "amount": 5 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "category is required for an expense"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(auth_cookie)
            .json(&json!({ "transactionType": "transfer", "amount": 5 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }
}
