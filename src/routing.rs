//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};

use crate::{
    AppState,
    auth::{auth_guard, get_current_user, get_log_out, post_log_in, register_user},
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_analytics_endpoint,
        get_spending_trends_endpoint, list_budgets_endpoint, update_budget_endpoint,
    },
    endpoints,
    not_found::get_404_not_found,
    reminder::{
        create_reminder_endpoint, delete_reminder_endpoint, get_spending_alerts_endpoint,
        get_today_reminders_endpoint, list_reminders_endpoint, mark_reminder_read_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint,
        get_transaction_summary_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out));

    let protected_routes = Router::new()
        .route(endpoints::CURRENT_USER, get(get_current_user))
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_SUMMARY,
            get(get_transaction_summary_endpoint),
        )
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(
            endpoints::BUDGETS,
            post(create_budget_endpoint).get(list_budgets_endpoint),
        )
        .route(
            endpoints::BUDGET,
            put(update_budget_endpoint).delete(delete_budget_endpoint),
        )
        .route(
            endpoints::BUDGET_ANALYTICS,
            get(get_budget_analytics_endpoint),
        )
        .route(endpoints::SPENDING_TRENDS, get(get_spending_trends_endpoint))
        .route(
            endpoints::REMINDERS,
            post(create_reminder_endpoint).get(list_reminders_endpoint),
        )
        .route(endpoints::REMINDERS_TODAY, get(get_today_reminders_endpoint))
        .route(endpoints::SPENDING_ALERTS, get(get_spending_alerts_endpoint))
        .route(endpoints::REMINDER_READ, patch(mark_reminder_read_endpoint))
        .route(endpoints::REMINDER, delete(delete_reminder_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{endpoints, routing::build_router, test_utils::get_test_app_state};

    #[tokio::test]
    async fn protected_routes_require_log_in() {
        let server = TestServer::new(build_router(get_test_app_state())).unwrap();

        for endpoint in [
            endpoints::CURRENT_USER,
            endpoints::TRANSACTIONS,
            endpoints::TRANSACTIONS_SUMMARY,
            endpoints::BUDGETS,
            endpoints::BUDGET_ANALYTICS,
            endpoints::SPENDING_TRENDS,
            endpoints::REMINDERS,
            endpoints::REMINDERS_TODAY,
            endpoints::SPENDING_ALERTS,
        ] {
            server
                .get(endpoint)
                .await
                .assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn log_in_is_public() {
        let server = TestServer::new(build_router(get_test_app_state())).unwrap();

        server
            .post(endpoints::LOG_IN_API)
            .json(&serde_json::json!({ "email": "nobody@example.com", "password": "nope" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
