//! Endpoints for the budget analytics and spending trends.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        BudgetAnalytics, MonthQuery, SpendingTrends, TrendPeriod, get_budget_analytics,
        get_spending_trends,
    },
    extract::ApiQuery,
    timezone::get_local_today,
};

/// The state needed for the budget reports.
#[derive(Debug, Clone)]
pub struct BudgetReportState {
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the budget analytics for a month, defaulting to the current month.
pub async fn get_budget_analytics_endpoint(
    State(state): State<BudgetReportState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<MonthQuery>,
) -> Result<Json<BudgetAnalytics>, Error> {
    let (month, year) = query.resolve(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_budget_analytics(user_id, month, year, &connection).map(Json)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpendingTrendsQuery {
    #[serde(default)]
    pub period: TrendPeriod,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrendsResponse {
    pub spending_trends: SpendingTrends,
}

/// Get the expense totals by month and category up to the current month.
pub async fn get_spending_trends_endpoint(
    State(state): State<BudgetReportState>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(query): ApiQuery<SpendingTrendsQuery>,
) -> Result<Json<SpendingTrendsResponse>, Error> {
    let today = get_local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let spending_trends = get_spending_trends(user_id, query.period, today, &connection)?;

    Ok(Json(SpendingTrendsResponse { spending_trends }))
}

#[cfg(test)]
mod budget_report_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, test_utils::get_logged_in_server};

    #[tokio::test]
    async fn analytics_reflect_recorded_expenses() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        for (category, amount) in [("Food", 1000), ("Transport", 500)] {
            server
                .post(endpoints::BUDGETS)
                .add_cookie(auth_cookie.clone())
                .json(&json!({
                    "category": category,
                    "budgetAmount": amount,
                    "month": 3,
                    "year": 2024
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }
        for (category, amount) in [("Food", 1150), ("Transport", 100)] {
            server
                .post(endpoints::TRANSACTIONS)
                .add_cookie(auth_cookie.clone())
                .json(&json!({
                    "transactionType": "expense",
                    "amount": amount,
                    "date": "2024-03-10",
                    "category": category
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get(endpoints::BUDGET_ANALYTICS)
            .add_query_param("month", 3)
            .add_query_param("year", 2024)
            .add_cookie(auth_cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["overview"]["totalBudget"], 1500.0);
        assert_eq!(body["overview"]["totalSpent"], 1250.0);
        assert_eq!(body["overview"]["overspending"], 150.0);
        assert_eq!(body["overview"]["exceededBudgets"], 1);
        assert_eq!(body["categoryData"].as_array().unwrap().len(), 2);
        assert_eq!(body["trendData"].as_array().unwrap().len(), 6);
        assert_eq!(body["trendData"][5]["month"], "Mar 2024");
        assert_eq!(body["alerts"][0]["type"], "error");
    }

    #[tokio::test]
    async fn analytics_reject_year_out_of_range() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .get(endpoints::BUDGET_ANALYTICS)
            .add_query_param("month", 3)
            .add_query_param("year", 200_000_000)
            .add_cookie(auth_cookie)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn spending_trends_default_to_six_months() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .get(endpoints::SPENDING_TRENDS)
            .add_cookie(auth_cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["spendingTrends"].as_object().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn spending_trends_for_last_year() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .get(endpoints::SPENDING_TRENDS)
            .add_query_param("period", "lastyear")
            .add_cookie(auth_cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["spendingTrends"].as_object().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn spending_trends_reject_unknown_period() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .get(endpoints::SPENDING_TRENDS)
            .add_query_param("period", "forever")
            .add_cookie(auth_cookie)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
