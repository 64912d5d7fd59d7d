//! The budget listing endpoint.

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
    budget::{BudgetView, db::get_budgets_for_month},
    extract::ApiQuery,
    timezone::get_local_today,
    transaction::first_of_month,
};

/// The state needed for listing budgets.
#[derive(Debug, Clone)]
pub struct ListBudgetsState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListBudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Selects a month. Missing parts default to the current month.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQuery {
    pub month: Option<u8>,
    pub year: Option<i32>,
}

impl MonthQuery {
    /// The selected month and year, filling in the gaps from the current date
    /// in `local_timezone`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidTimezoneError] if a default is needed and
    /// `local_timezone` is not a known timezone, or an [Error::Validation] if
    /// the month or year is out of range.
    pub fn resolve(&self, local_timezone: &str) -> Result<(u8, i32), Error> {
        let (month, year) = match (self.month, self.year) {
            (Some(month), Some(year)) => (month, year),
            (month, year) => {
                let today = get_local_today(local_timezone)?;
                (
                    month.unwrap_or_else(|| u8::from(today.month())),
                    year.unwrap_or_else(|| today.year()),
                )
            }
        };

        first_of_month(year, month)?;

        Ok((month, year))
    }
}

/// List the user's budgets for a month, ordered by category.
pub async fn list_budgets_endpoint(
    State(state): State<ListBudgetsState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> Result<Json<Vec<BudgetView>>, Error> {
    let (month, year) = query.resolve(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_for_month(user_id, month, year, &connection)?;

    Ok(Json(budgets.iter().map(BudgetView::from).collect()))
}

#[cfg(test)]
mod list_budgets_endpoint_tests {
    use serde_json::{Value, json};

    use crate::{Error, budget::MonthQuery, endpoints, test_utils::get_logged_in_server};

    #[tokio::test]
    async fn lists_only_requested_month() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        for (category, month) in [("Food", 3), ("Bills", 3), ("Food", 4)] {
            server
                .post(endpoints::BUDGETS)
                .add_cookie(auth_cookie.clone())
                .json(&json!({
                    "category": category,
                    "budgetAmount": 100,
                    "month": month,
                    "year": 2024
                }))
                .await;
        }

        let response = server
            .get(endpoints::BUDGETS)
            .add_query_param("month", 3)
            .add_query_param("year", 2024)
            .add_cookie(auth_cookie)
            .await;

        response.assert_status_ok();
        let body: Vec<Value> = response.json();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["category"], "Bills");
        assert_eq!(body[1]["category"], "Food");
    }

    #[test]
    fn month_query_uses_given_values() {
        let query = MonthQuery {
            month: Some(2),
            year: Some(2023),
        };

        assert_eq!(query.resolve("Not/AZone"), Ok((2, 2023)));
    }

    #[test]
    fn month_query_rejects_out_of_range_values() {
        let huge_year = MonthQuery {
            month: Some(3),
            year: Some(200_000_000),
        };
        let bad_month = MonthQuery {
            month: Some(13),
            year: Some(2024),
        };

        assert!(matches!(
            huge_year.resolve("Etc/UTC"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            bad_month.resolve("Etc/UTC"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn month_query_defaults_to_current_month() {
        let today = time::OffsetDateTime::now_utc().date();

        let (month, year) = MonthQuery::default().resolve("Etc/UTC").unwrap();

        assert!((1..=12).contains(&month));
        assert!((year - today.year()).abs() <= 1);
    }
}
