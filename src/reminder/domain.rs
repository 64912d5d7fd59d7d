//! Reminder models and the validation of new reminders.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time, macros::format_description};

use crate::{
    Error, auth::UserID, database_id::ReminderId, reminder::schedule::first_occurrence,
    transaction::text_enum,
};

/// What a reminder reminds the user about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Warn when the month's expenses go over a limit.
    SpendingLimit,
    Weekly,
    Monthly,
    /// Fire once on the start date.
    Custom,
}

text_enum!(ReminderKind {
    SpendingLimit => "spending_limit",
    Weekly => "weekly",
    Monthly => "monthly",
    Custom => "custom",
});

impl ReminderKind {
    /// Whether the reminder fires on dates rather than on spending.
    pub fn is_scheduled(self) -> bool {
        self != ReminderKind::SpendingLimit
    }
}

/// A reminder as stored and sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserID,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_reminder_date: Option<Date>,
    /// The time of day to show the reminder, "HH:MM".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    pub is_active: bool,
    pub is_read: bool,
    /// The last day the reminder fired, used to fire at most once a day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fired_date: Option<Date>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated reminder that is ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub title: String,
    pub description: String,
    pub kind: ReminderKind,
    pub limit_amount: Option<f64>,
    pub start_date: Option<Date>,
    pub next_reminder_date: Option<Date>,
    pub reminder_time: Option<String>,
}

/// The reminder details sent by the client.
///
/// Fields that do not apply to the reminder type are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderForm {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ReminderKind>,
    pub limit_amount: Option<f64>,
    pub start_date: Option<Date>,
    pub reminder_time: Option<String>,
}

impl ReminderForm {
    /// Check the form and work out when the reminder first fires.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] naming the first missing or invalid field.
    pub fn validate(self) -> Result<NewReminder, Error> {
        let required = |field: &str| Error::Validation(format!("{field} is required"));

        let title = self
            .title
            .map(|title| title.trim().to_owned())
            .filter(|title| !title.is_empty())
            .ok_or_else(|| required("title"))?;
        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .unwrap_or_default();
        let kind = self.kind.ok_or_else(|| required("type"))?;

        if !kind.is_scheduled() {
            let limit_amount = self.limit_amount.ok_or_else(|| required("limitAmount"))?;
            if !limit_amount.is_finite() || limit_amount < 0.0 {
                return Err(Error::Validation(
                    "limitAmount must be a non-negative number".to_owned(),
                ));
            }

            return Ok(NewReminder {
                title,
                description,
                kind,
                limit_amount: Some(limit_amount),
                start_date: None,
                next_reminder_date: None,
                reminder_time: None,
            });
        }

        let start_date = self.start_date.ok_or_else(|| required("startDate"))?;
        let reminder_time = self
            .reminder_time
            .as_deref()
            .map(str::trim)
            .filter(|time| !time.is_empty())
            .ok_or_else(|| required("reminderTime"))
            .and_then(parse_reminder_time)?;
        let next_reminder_date = first_occurrence(kind, start_date).ok_or_else(|| {
            Error::Validation(format!("{kind} reminder starting {start_date} never fires"))
        })?;

        Ok(NewReminder {
            title,
            description,
            kind,
            limit_amount: None,
            start_date: Some(start_date),
            next_reminder_date: Some(next_reminder_date),
            reminder_time: Some(reminder_time),
        })
    }
}

/// Parse a time of day in 24 hour "HH:MM" form, returning it zero padded.
///
/// # Errors
///
/// Returns an [Error::Validation] if `text` is not a valid time of day.
pub fn parse_reminder_time(text: &str) -> Result<String, Error> {
    let invalid = || Error::Validation(format!("reminderTime must be HH:MM, got \"{text}\""));
    let format = format_description!("[hour]:[minute]");

    Time::parse(text, format)
        .map_err(|_| invalid())?
        .format(format)
        .map_err(|_| invalid())
}
