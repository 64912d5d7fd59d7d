//! The budget update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Path, State},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        BudgetPeriod, BudgetSettings, BudgetView,
        db::{get_budget, update_budget_settings},
    },
    database_id::BudgetId,
    extract::ApiJson,
};

/// The state needed for updating a budget.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The budget settings to change. Fields that are left out keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBudgetForm {
    pub budget_amount: Option<f64>,
    pub period: Option<BudgetPeriod>,
    pub alert_threshold: Option<u8>,
    pub alert_enabled: Option<bool>,
}

impl EditBudgetForm {
    fn apply_to(self, current: BudgetSettings) -> BudgetSettings {
        BudgetSettings {
            budget_amount: self.budget_amount.unwrap_or(current.budget_amount),
            period: self.period.unwrap_or(current.period),
            alert_threshold: self.alert_threshold.unwrap_or(current.alert_threshold),
            alert_enabled: self.alert_enabled.unwrap_or(current.alert_enabled),
        }
    }
}

/// Change the settings of one of the user's budgets.
///
/// The category and month of a budget cannot be changed.
pub async fn update_budget_endpoint(
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
    Path(budget_id): Path<BudgetId>,
    ApiJson(form): ApiJson<EditBudgetForm>,
) -> Result<Json<BudgetView>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let current = get_budget(user_id, budget_id, &connection)?;
    let settings = form
        .apply_to(BudgetSettings {
            budget_amount: current.budget_amount,
            period: current.period,
            alert_threshold: current.alert_threshold,
            alert_enabled: current.alert_enabled,
        })
        .validate()?;

    let budget = update_budget_settings(user_id, budget_id, &settings, &connection)?;

    Ok(Json(BudgetView::from(budget)))
}

#[cfg(test)]
mod update_budget_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{endpoints, endpoints::format_endpoint, test_utils::get_logged_in_server};

    #[tokio::test]
    async fn updates_only_given_fields() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        let created: Value = server
            .post(endpoints::BUDGETS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({
                "category": "Food",
                "budgetAmount": 1000,
                "month": 3,
                "year": 2024,
                "alertThreshold": 75
            }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::BUDGET, id))
            .add_cookie(auth_cookie)
            .json(&json!({ "budgetAmount": 1200 }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["budgetAmount"], 1200.0);
        assert_eq!(body["alertThreshold"], 75);
        assert_eq!(body["category"], "Food");
        assert_eq!(body["remainingAmount"], 1200.0);
    }

    #[tokio::test]
    async fn invalid_threshold_is_rejected() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;
        let created: Value = server
            .post(endpoints::BUDGETS)
            .add_cookie(auth_cookie.clone())
            .json(&json!({ "category": "Food", "budgetAmount": 10, "month": 3, "year": 2024 }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = server
            .put(&format_endpoint(endpoints::BUDGET, id))
            .add_cookie(auth_cookie)
            .json(&json!({ "alertThreshold": 150 }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_budget_is_not_found() {
        let (server, auth_cookie, _, _) = get_logged_in_server().await;

        let response = server
            .put(&format_endpoint(endpoints::BUDGET, 999))
            .add_cookie(auth_cookie)
            .json(&json!({ "budgetAmount": 5 }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
