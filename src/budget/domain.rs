//! Budget models, the derived figures and the alert rule.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::BudgetId,
    transaction::{ExpenseCategory, text_enum},
};

/// The default utilization percentage at which a budget alert fires.
pub const DEFAULT_ALERT_THRESHOLD: u8 = 80;

/// The span of time a budget amount is intended to cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

text_enum!(BudgetPeriod {
    Weekly => "weekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

/// A spending limit for one category in one month.
///
/// There is at most one budget per user, category, month and year. The
/// remaining and exceeded figures are not stored, see [Budget::remaining_amount],
/// [Budget::is_exceeded] and [Budget::exceeded_amount].
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub category: ExpenseCategory,
    pub budget_amount: f64,
    pub period: BudgetPeriod,
    /// The total of the matching expenses recorded against this budget.
    pub spent_amount: f64,
    /// Utilization percentage, 0 to 100, at which an alert fires.
    pub alert_threshold: u8,
    pub alert_enabled: bool,
    pub month: u8,
    pub year: i32,
}

impl Budget {
    /// How much can still be spent, never negative.
    pub fn remaining_amount(&self) -> f64 {
        (self.budget_amount - self.spent_amount).max(0.0)
    }

    /// Whether more than the budget amount has been spent.
    pub fn is_exceeded(&self) -> bool {
        self.spent_amount > self.budget_amount
    }

    /// How much was spent over the budget, or zero if the budget is not exceeded.
    pub fn exceeded_amount(&self) -> f64 {
        if self.is_exceeded() {
            self.spent_amount - self.budget_amount
        } else {
            0.0
        }
    }

    /// The percentage of the budget that has been spent.
    ///
    /// A zero budget has a utilization of zero.
    pub fn utilization(&self) -> f64 {
        percentage(self.spent_amount, self.budget_amount)
    }

    /// Decide whether this budget should raise an alert.
    ///
    /// An alert fires if alerts are enabled and the budget is either exceeded
    /// or its utilization has reached the alert threshold.
    pub fn evaluate_alert(&self) -> Option<BudgetAlert> {
        if !self.alert_enabled {
            return None;
        }

        if self.is_exceeded() {
            let exceeded_amount = self.exceeded_amount();

            return Some(BudgetAlert {
                category: self.category,
                message: format!(
                    "{} budget exceeded by {:.2}",
                    self.category, exceeded_amount
                ),
                severity: AlertSeverity::Error,
                budget_amount: self.budget_amount,
                spent_amount: self.spent_amount,
                exceeded_amount: Some(exceeded_amount),
            });
        }

        let utilization = self.utilization();
        if self.budget_amount > 0.0 && utilization >= f64::from(self.alert_threshold) {
            return Some(BudgetAlert {
                category: self.category,
                message: format!("{} budget is {:.1}% used", self.category, utilization),
                severity: AlertSeverity::Warning,
                budget_amount: self.budget_amount,
                spent_amount: self.spent_amount,
                exceeded_amount: None,
            });
        }

        None
    }
}

/// `part` as a percentage of `whole`, or zero if `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// A budget together with its derived figures, as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    pub id: BudgetId,
    pub category: ExpenseCategory,
    pub budget_amount: f64,
    pub period: BudgetPeriod,
    pub spent_amount: f64,
    pub remaining_amount: f64,
    pub alert_threshold: u8,
    pub alert_enabled: bool,
    pub month: u8,
    pub year: i32,
    pub is_exceeded: bool,
    pub exceeded_amount: f64,
}

impl From<&Budget> for BudgetView {
    fn from(budget: &Budget) -> Self {
        Self {
            id: budget.id,
            category: budget.category,
            budget_amount: budget.budget_amount,
            period: budget.period,
            spent_amount: budget.spent_amount,
            remaining_amount: budget.remaining_amount(),
            alert_threshold: budget.alert_threshold,
            alert_enabled: budget.alert_enabled,
            month: budget.month,
            year: budget.year,
            is_exceeded: budget.is_exceeded(),
            exceeded_amount: budget.exceeded_amount(),
        }
    }
}

impl From<Budget> for BudgetView {
    fn from(budget: Budget) -> Self {
        Self::from(&budget)
    }
}

/// How serious a budget alert is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// The budget has been exceeded.
    Error,
    /// The budget has reached its alert threshold.
    Warning,
}

/// Tells the user that a budget is close to, or over, its limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    pub category: ExpenseCategory,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub budget_amount: f64,
    pub spent_amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceeded_amount: Option<f64>,
}

/// The mutable settings of a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSettings {
    pub budget_amount: f64,
    pub period: BudgetPeriod,
    pub alert_threshold: u8,
    pub alert_enabled: bool,
}

impl BudgetSettings {
    /// Check the ranges of the settings.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if the budget amount is negative or not
    /// finite, or the alert threshold is over 100.
    pub fn validate(self) -> Result<Self, Error> {
        if !self.budget_amount.is_finite() || self.budget_amount < 0.0 {
            return Err(Error::Validation(
                "budgetAmount must be a non-negative number".to_owned(),
            ));
        }

        if self.alert_threshold > 100 {
            return Err(Error::Validation(
                "alertThreshold must be between 0 and 100".to_owned(),
            ));
        }

        Ok(self)
    }
}

/// The key and settings needed to create or update a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUpsert {
    pub category: ExpenseCategory,
    pub month: u8,
    pub year: i32,
    pub settings: BudgetSettings,
}
