//! Budget analytics: the monthly overview, per-category breakdown, trend
//! over the previous months and the spending trends by category.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Month, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    budget::{
        Budget, BudgetAlert,
        db::{get_budgets_for_month, recompute_spent_amounts},
        domain::percentage,
    },
    transaction::{
        ExpenseCategory, first_of_month, get_monthly_category_totals, sum_expenses_for_period,
    },
};

/// The number of months, including the requested one, covered by the trend data.
const TREND_MONTHS: i32 = 6;

/// The totals across all of a user's budgets for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOverview {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    /// The sum of the exceeded amounts of the budgets that were exceeded.
    pub overspending: f64,
    pub exceeded_budgets: usize,
    pub budget_utilization: f64,
}

/// One category's row in the analytics breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: ExpenseCategory,
    pub budgeted: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub is_exceeded: bool,
    pub exceeded_amount: f64,
    pub alert_threshold: u8,
}

impl From<&Budget> for CategoryBreakdown {
    fn from(budget: &Budget) -> Self {
        Self {
            category: budget.category,
            budgeted: budget.budget_amount,
            spent: budget.spent_amount,
            remaining: budget.remaining_amount(),
            percentage: budget.utilization(),
            is_exceeded: budget.is_exceeded(),
            exceeded_amount: budget.exceeded_amount(),
            alert_threshold: budget.alert_threshold,
        }
    }
}

/// The budget totals for one month in the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// The month label, e.g. "Mar 2024".
    pub month: String,
    pub total_budget: f64,
    pub total_spent: f64,
    pub utilization: f64,
}

/// Everything the budget dashboard shows for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalytics {
    pub overview: BudgetOverview,
    pub category_data: Vec<CategoryBreakdown>,
    pub trend_data: Vec<TrendPoint>,
    pub alerts: Vec<BudgetAlert>,
}

/// Build the analytics for the budgets of `user_id` in the given month.
///
/// The spent amounts of the month's budgets are first recalculated from the
/// transaction history and saved, so the figures reflect deleted
/// transactions too.
///
/// # Errors
///
/// Returns an [Error::Validation] if `month` is not between 1 and 12 or `year`
/// is out of range, or an [Error::SqlError] if a query fails.
pub fn get_budget_analytics(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<BudgetAnalytics, Error> {
    first_of_month(year, month)?;

    recompute_spent_amounts(user_id, month, year, connection)?;
    let budgets = get_budgets_for_month(user_id, month, year, connection)?;

    Ok(BudgetAnalytics {
        overview: summarize_budgets(&budgets),
        category_data: budgets.iter().map(CategoryBreakdown::from).collect(),
        trend_data: get_trend_data(user_id, month, year, connection)?,
        alerts: budgets.iter().filter_map(Budget::evaluate_alert).collect(),
    })
}

/// Total up a month's budgets.
pub fn summarize_budgets(budgets: &[Budget]) -> BudgetOverview {
    let total_budget: f64 = budgets.iter().map(|budget| budget.budget_amount).sum();
    let total_spent: f64 = budgets.iter().map(|budget| budget.spent_amount).sum();

    BudgetOverview {
        total_budget,
        total_spent,
        remaining: (total_budget - total_spent).max(0.0),
        overspending: budgets.iter().map(Budget::exceeded_amount).sum(),
        exceeded_budgets: budgets.iter().filter(|budget| budget.is_exceeded()).count(),
        budget_utilization: percentage(total_spent, total_budget),
    }
}

fn get_trend_data(
    user_id: UserID,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<Vec<TrendPoint>, Error> {
    (0..TREND_MONTHS)
        .rev()
        .map(|months_ago| {
            let (year, month) = shift_month(year, month, -months_ago)?;
            let budgets = get_budgets_for_month(user_id, month, year, connection)?;

            let total_budget: f64 = budgets.iter().map(|budget| budget.budget_amount).sum();
            let total_spent = budgets.iter().try_fold(0.0, |total, budget| {
                sum_expenses_for_period(user_id, budget.category, month, year, connection)
                    .map(|spent| total + spent)
            })?;

            Ok(TrendPoint {
                month: month_label(year, month)?,
                total_budget,
                total_spent,
                utilization: percentage(total_spent, total_budget),
            })
        })
        .collect()
}

/// How far back the spending trends go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    /// The current month and the five before it.
    #[default]
    Last6Months,
    /// The current month and the eleven before it.
    LastYear,
}

impl TrendPeriod {
    fn months(self) -> i32 {
        match self {
            TrendPeriod::Last6Months => 6,
            TrendPeriod::LastYear => 12,
        }
    }
}

/// Expense totals keyed by month ("YYYY-MM") and then by category name.
pub type SpendingTrends = BTreeMap<String, BTreeMap<String, f64>>;

/// Total the expenses of `user_id` by month and category over `period`,
/// ending with the month that `today` is in.
///
/// Every month in the period has an entry, empty if nothing was spent.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the query fails.
pub fn get_spending_trends(
    user_id: UserID,
    period: TrendPeriod,
    today: Date,
    connection: &Connection,
) -> Result<SpendingTrends, Error> {
    let (start_year, start_month) =
        shift_month(today.year(), u8::from(today.month()), 1 - period.months())?;
    let start = first_of_month(start_year, start_month)?;

    let mut trends: SpendingTrends = (0..period.months())
        .map(|offset| {
            let (year, month) = shift_month(start_year, start_month, offset)?;
            Ok((month_key(year, month), BTreeMap::new()))
        })
        .collect::<Result<_, Error>>()?;

    for total in get_monthly_category_totals(user_id, start, connection)? {
        trends
            .entry(month_key(total.year, total.month))
            .or_default()
            .insert(total.category.to_string(), total.total);
    }

    Ok(trends)
}

/// Move `months` calendar months from `month` in `year`, returning the new
/// year and month.
///
/// # Errors
///
/// Returns an [Error::Validation] if the result does not fit in an `i32` year.
pub fn shift_month(year: i32, month: u8, months: i32) -> Result<(i32, u8), Error> {
    let index = year
        .checked_mul(12)
        .and_then(|index| index.checked_add(i32::from(month) - 1))
        .and_then(|index| index.checked_add(months))
        .ok_or_else(|| Error::Validation(format!("year {year} is out of range")))?;

    Ok((index.div_euclid(12), (index.rem_euclid(12) + 1) as u8))
}

fn month_key(year: i32, month: u8) -> String {
    format!("{year:04}-{month:02}")
}

fn month_label(year: i32, month: u8) -> Result<String, Error> {
    let date = Date::from_calendar_date(year, Month::try_from(month)?, 1)?;

    date.format(format_description!("[month repr:short] [year]"))
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), date.to_string()))
}
