//! Reminders: dated reminders that fire weekly, monthly or once, and
//! spending limits that warn when the month's expenses go over a limit.

mod create;
mod db;
mod domain;
mod list;
mod schedule;
mod status;
mod sweep;

pub use create::create_reminder_endpoint;
pub use db::create_reminder_table;
pub use domain::{NewReminder, Reminder, ReminderForm, ReminderKind};
pub use list::{
    get_spending_alerts_endpoint, get_today_reminders_endpoint, list_reminders_endpoint,
};
pub use status::{delete_reminder_endpoint, mark_reminder_read_endpoint};
pub use sweep::{SpendingLimitAlert, due_today_sweep, spending_limit_evaluation};
