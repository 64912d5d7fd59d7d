//! Keeps budget spending in step with the expenses a user records.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    budget::{
        Budget, BudgetAlert, BudgetUpsert,
        db::{increment_spent_amount, upsert_budget},
    },
    transaction::{ExpenseCategory, first_of_month},
};

/// Create or update the budget for the upsert's category and month.
///
/// # Errors
///
/// Returns an [Error::Validation] if the settings are out of range, or an
/// [Error::SqlError] if the budget could not be stored.
pub fn upsert_budget_for_period(
    user_id: UserID,
    upsert: BudgetUpsert,
    connection: &Connection,
) -> Result<Budget, Error> {
    let upsert = BudgetUpsert {
        settings: upsert.settings.validate()?,
        ..upsert
    };

    first_of_month(upsert.year, upsert.month)?;

    upsert_budget(user_id, &upsert, connection)
}

/// Count an expense against the budget for its category and month.
///
/// Returns the alert raised by the updated budget, if any. If the user has
/// not set a budget for the category in that month nothing happens.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the budget could not be updated.
pub fn apply_expense(
    user_id: UserID,
    category: ExpenseCategory,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<Option<BudgetAlert>, Error> {
    let month = u8::from(date.month());
    let budget = increment_spent_amount(user_id, category, month, date.year(), amount, connection)?;

    match budget {
        Some(budget) => {
            tracing::debug!(
                "Budget {} for {category} {month}/{} is now at {:.2} of {:.2}",
                budget.id,
                budget.year,
                budget.spent_amount,
                budget.budget_amount
            );
            Ok(budget.evaluate_alert())
        }
        None => Ok(None),
    }
}
