//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/budgets/{budget_id}', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for registering a user.
pub const USERS: &str = "/api/users";
/// The route for getting the logged-in user.
pub const CURRENT_USER: &str = "/api/users/me";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/auth/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/log_out";

/// The route to create and list transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the monthly income and expense summary.
pub const TRANSACTIONS_SUMMARY: &str = "/api/transactions/summary";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

/// The route to upsert and list budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route for the budget analytics of a month.
pub const BUDGET_ANALYTICS: &str = "/api/budgets/analytics";
/// The route for expense totals by month and category.
pub const SPENDING_TRENDS: &str = "/api/budgets/spending-trends";

/// The route to create and list reminders.
pub const REMINDERS: &str = "/api/reminders";
/// The route for the reminders that are due today.
pub const REMINDERS_TODAY: &str = "/api/reminders/today";
/// The route for the alerts of spending limit reminders.
pub const SPENDING_ALERTS: &str = "/api/reminders/spending-alerts";
/// The route to mark a reminder as read.
pub const REMINDER_READ: &str = "/api/reminders/{reminder_id}/read";
/// The route to access a single reminder.
pub const REMINDER: &str = "/api/reminders/{reminder_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints::{self, format_endpoint};

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::COFFEE,
            endpoints::USERS,
            endpoints::CURRENT_USER,
            endpoints::LOG_IN_API,
            endpoints::LOG_OUT,
            endpoints::TRANSACTIONS,
            endpoints::TRANSACTIONS_SUMMARY,
            endpoints::TRANSACTION,
            endpoints::BUDGETS,
            endpoints::BUDGET,
            endpoints::BUDGET_ANALYTICS,
            endpoints::SPENDING_TRENDS,
            endpoints::REMINDERS,
            endpoints::REMINDERS_TODAY,
            endpoints::SPENDING_ALERTS,
            endpoints::REMINDER_READ,
            endpoints::REMINDER,
        ] {
            assert!(endpoint.parse::<Uri>().is_ok(), "{endpoint} is not a valid URI");
        }
    }

    #[test]
    fn replaces_trailing_parameter() {
        let formatted_path = format_endpoint(endpoints::BUDGET, 7);

        assert_eq!(formatted_path, "/api/budgets/7");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn replaces_parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::REMINDER_READ, 12);

        assert_eq!(formatted_path, "/api/reminders/12/read");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        assert_eq!(format_endpoint(endpoints::BUDGETS, 1), endpoints::BUDGETS);
    }
}
