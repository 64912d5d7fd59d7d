//! Category budgets: the ledger that tracks spending against them, alerts
//! and analytics.

mod analytics;
mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod ledger;
mod list;
mod report;

pub use analytics::{
    BudgetAnalytics, SpendingTrends, TrendPeriod, get_budget_analytics, get_spending_trends,
    shift_month,
};
pub use create::create_budget_endpoint;
pub use db::create_budget_table;
pub use delete::delete_budget_endpoint;
pub use domain::{
    AlertSeverity, Budget, BudgetAlert, BudgetPeriod, BudgetSettings, BudgetUpsert, BudgetView,
    DEFAULT_ALERT_THRESHOLD,
};
pub use edit::update_budget_endpoint;
pub use ledger::{apply_expense, upsert_budget_for_period};
pub use list::{MonthQuery, list_budgets_endpoint};
pub use report::{get_budget_analytics_endpoint, get_spending_trends_endpoint};
