//! Database queries for budgets.
//!
//! Every query is scoped to the owning user, so budgets belonging to other
//! users are reported as not found.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetSettings, BudgetUpsert},
    database_id::BudgetId,
    transaction::ExpenseCategory,
};

const BUDGET_COLUMNS: &str = "id, category, budget_amount, period, spent_amount, alert_threshold, \
     alert_enabled, month, year";

/// Create the budget table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL,
                budget_amount REAL NOT NULL CHECK (budget_amount >= 0),
                period TEXT NOT NULL DEFAULT 'monthly',
                spent_amount REAL NOT NULL DEFAULT 0 CHECK (spent_amount >= 0),
                alert_threshold INTEGER NOT NULL DEFAULT 80
                    CHECK (alert_threshold BETWEEN 0 AND 100),
                alert_enabled INTEGER NOT NULL DEFAULT 1,
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                UNIQUE(user_id, category, month, year),
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Create the budget for the upsert's category and month, or update the
/// settings of the existing one.
///
/// A new budget starts with the total of the user's matching expenses that
/// were recorded before the budget existed. Updating an existing budget
/// leaves its spent amount alone.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn upsert_budget(
    user_id: UserID,
    upsert: &BudgetUpsert,
    connection: &Connection,
) -> Result<Budget, Error> {
    let settings = &upsert.settings;

    let budget = connection
        .prepare(&format!(
            "INSERT INTO budget
                (user_id, category, budget_amount, period, spent_amount, alert_threshold,
                 alert_enabled, month, year)
             VALUES (
                ?1, ?2, ?3, ?4,
                (SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
                 WHERE user_id = ?1 AND transaction_type = 'expense'
                    AND category = ?2 AND month = ?7 AND year = ?8),
                ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id, category, month, year) DO UPDATE SET
                budget_amount = excluded.budget_amount,
                period = excluded.period,
                alert_threshold = excluded.alert_threshold,
                alert_enabled = excluded.alert_enabled
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                upsert.category,
                settings.budget_amount,
                settings.period,
                settings.alert_threshold,
                settings.alert_enabled,
                upsert.month,
                upsert.year,
            ],
            map_budget_row,
        )?;

    Ok(budget)
}

/// Retrieve the budget `budget_id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the budget does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((budget_id, user_id.as_i64()), map_budget_row)
        .map_err(Error::from)
}

/// Retrieve the budget of `user_id` for `category` in the given month, if there is one.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_budget_for_period(
    user_id: UserID,
    category: ExpenseCategory,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    match connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget
             WHERE user_id = ?1 AND category = ?2 AND month = ?3 AND year = ?4"
        ))?
        .query_row((user_id.as_i64(), category, month, year), map_budget_row)
    {
        Ok(budget) => Ok(Some(budget)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Retrieve the budgets of `user_id` for the given month, ordered by category.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_budgets_for_month(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget
             WHERE user_id = ?1 AND month = ?2 AND year = ?3
             ORDER BY category"
        ))?
        .query_map((user_id.as_i64(), month, year), map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::from))
        .collect()
}

/// Change the settings of the budget `budget_id` owned by `user_id`.
///
/// The category, month, year and spent amount are left as they are.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the budget does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget_settings(
    user_id: UserID,
    budget_id: BudgetId,
    settings: &BudgetSettings,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "UPDATE budget
             SET budget_amount = ?1, period = ?2, alert_threshold = ?3, alert_enabled = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                settings.budget_amount,
                settings.period,
                settings.alert_threshold,
                settings.alert_enabled,
                budget_id,
                user_id.as_i64(),
            ],
            map_budget_row,
        )
        .map_err(Error::from)
}

/// Add `amount` to the spent amount of the matching budget in a single
/// statement and return the updated budget.
///
/// Returns `None` without changing anything if the user has no budget for
/// `category` in the given month.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn increment_spent_amount(
    user_id: UserID,
    category: ExpenseCategory,
    month: u8,
    year: i32,
    amount: f64,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    match connection
        .prepare(&format!(
            "UPDATE budget SET spent_amount = spent_amount + ?1
             WHERE user_id = ?2 AND category = ?3 AND month = ?4 AND year = ?5
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (amount, user_id.as_i64(), category, month, year),
            map_budget_row,
        ) {
        Ok(budget) => Ok(Some(budget)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(error) => Err(error.into()),
    }
}

/// Set the spent amount of every budget of `user_id` in the given month to
/// the total of the matching expense transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn recompute_spent_amounts(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "UPDATE budget SET spent_amount = (
                SELECT COALESCE(SUM(t.amount), 0) FROM \"transaction\" t
                WHERE t.user_id = budget.user_id AND t.transaction_type = 'expense'
                    AND t.category = budget.category
                    AND t.month = budget.month AND t.year = budget.year
             )
             WHERE user_id = ?1 AND month = ?2 AND year = ?3",
            (user_id.as_i64(), month, year),
        )
        .map_err(Error::from)
}

/// Delete the budget `budget_id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the budget does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(
    user_id: UserID,
    budget_id: BudgetId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        budget_amount: row.get(2)?,
        period: row.get(3)?,
        spent_amount: row.get(4)?,
        alert_threshold: row.get(5)?,
        alert_enabled: row.get(6)?,
        month: row.get(7)?,
        year: row.get(8)?,
    })
}
