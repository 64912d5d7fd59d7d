//! Monthly income and expense totals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::MonthQuery,
    extract::ApiQuery,
    transaction::ExpenseCategory,
};

/// The amount spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub category: ExpenseCategory,
    pub amount: f64,
}

/// Income and expenses for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub month: u8,
    pub year: i32,
    pub total_income: f64,
    pub total_expenses: f64,
    /// Income minus expenses, negative if the user spent more than they earned.
    pub balance: f64,
    /// Expense totals per category, largest first.
    pub category_breakdown: Vec<CategoryAmount>,
}

/// Total the transactions of `user_id` for the given month.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn summarize_month(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    let (total_income, total_expenses): (f64, f64) = connection.query_row(
        "SELECT
            COALESCE(SUM(CASE WHEN transaction_type = 'income' THEN amount END), 0),
            COALESCE(SUM(CASE WHEN transaction_type = 'expense' THEN amount END), 0)
         FROM \"transaction\"
         WHERE user_id = ?1 AND month = ?2 AND year = ?3",
        (user_id.as_i64(), month, year),
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let category_breakdown = connection
        .prepare(
            "SELECT category, SUM(amount) AS total FROM \"transaction\"
             WHERE user_id = ?1 AND transaction_type = 'expense' AND month = ?2 AND year = ?3
             GROUP BY category
             ORDER BY total DESC, category",
        )?
        .query_map((user_id.as_i64(), month, year), |row| {
            Ok(CategoryAmount {
                category: row.get(0)?,
                amount: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransactionSummary {
        month,
        year,
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
        category_breakdown,
    })
}

/// The state needed for the monthly summary.
#[derive(Debug, Clone)]
pub struct TransactionSummaryState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the monthly summary, defaulting to the current month.
pub async fn get_transaction_summary_endpoint(
    State(state): State<TransactionSummaryState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> Result<Json<TransactionSummary>, Error> {
    let (month, year) = query.resolve(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    summarize_month(user_id, month, year, &connection).map(Json)
}
