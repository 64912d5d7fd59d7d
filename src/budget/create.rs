//! The budget upsert endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        BudgetPeriod, BudgetSettings, BudgetUpsert, BudgetView, DEFAULT_ALERT_THRESHOLD,
        db::get_budget_for_period, upsert_budget_for_period,
    },
    extract::ApiJson,
    transaction::ExpenseCategory,
};

/// The state needed for creating or updating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The budget details sent by the client.
///
/// The key fields are optional here so that a missing field is reported
/// with a clear message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetForm {
    pub category: Option<ExpenseCategory>,
    pub budget_amount: Option<f64>,
    pub period: Option<BudgetPeriod>,
    pub alert_threshold: Option<u8>,
    pub alert_enabled: Option<bool>,
    pub month: Option<u8>,
    pub year: Option<i32>,
}

impl TryFrom<BudgetForm> for BudgetUpsert {
    type Error = Error;

    fn try_from(form: BudgetForm) -> Result<Self, Self::Error> {
        let required = |field: &str| Error::Validation(format!("{field} is required"));

        Ok(BudgetUpsert {
            category: form.category.ok_or_else(|| required("category"))?,
            month: form.month.ok_or_else(|| required("month"))?,
            year: form.year.ok_or_else(|| required("year"))?,
            settings: BudgetSettings {
                budget_amount: form.budget_amount.ok_or_else(|| required("budgetAmount"))?,
                period: form.period.unwrap_or_default(),
                alert_threshold: form.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
                alert_enabled: form.alert_enabled.unwrap_or(true),
            },
        })
    }
}

/// Create the budget for a category and month, or update it if it exists.
///
/// Responds with 201 when a budget was created and 200 when an existing one
/// was updated.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<BudgetForm>,
) -> Result<Response, Error> {
    let upsert = BudgetUpsert::try_from(form)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let existing =
        get_budget_for_period(user_id, upsert.category, upsert.month, upsert.year, &connection)?;
    let budget = upsert_budget_for_period(user_id, upsert, &connection)?;

    let status = if existing.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(BudgetView::from(budget))).into_response())
}
