//! Database queries for reminders.
//!
//! Every query is scoped to the owning user, so reminders belonging to other
//! users are reported as not found.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    database_id::ReminderId,
    reminder::{NewReminder, Reminder},
};

const REMINDER_COLUMNS: &str = "id, user_id, title, description, kind, limit_amount, start_date, \
     next_reminder_date, reminder_time, is_active, is_read, last_fired_date, created_at";

/// Create the reminder table.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_reminder_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS reminder (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                kind TEXT NOT NULL
                    CHECK (kind IN ('spending_limit', 'weekly', 'monthly', 'custom')),
                limit_amount REAL CHECK (limit_amount >= 0),
                start_date TEXT,
                next_reminder_date TEXT,
                reminder_time TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_read INTEGER NOT NULL DEFAULT 0,
                last_fired_date TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_reminder_user_next
         ON reminder(user_id, is_active, next_reminder_date);",
        (),
    )?;

    Ok(())
}

/// Store a new, active and unread reminder for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_reminder(
    user_id: UserID,
    new_reminder: &NewReminder,
    connection: &Connection,
) -> Result<Reminder, Error> {
    let reminder = connection
        .prepare(&format!(
            "INSERT INTO reminder
                (user_id, title, description, kind, limit_amount, start_date,
                 next_reminder_date, reminder_time, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {REMINDER_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                new_reminder.title,
                new_reminder.description,
                new_reminder.kind,
                new_reminder.limit_amount,
                new_reminder.start_date,
                new_reminder.next_reminder_date,
                new_reminder.reminder_time,
                OffsetDateTime::now_utc(),
            ],
            map_reminder_row,
        )?;

    Ok(reminder)
}

/// Retrieve the reminder `reminder_id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the reminder does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_reminder(
    user_id: UserID,
    reminder_id: ReminderId,
    connection: &Connection,
) -> Result<Reminder, Error> {
    connection
        .prepare(&format!(
            "SELECT {REMINDER_COLUMNS} FROM reminder WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((reminder_id, user_id.as_i64()), map_reminder_row)
        .map_err(Error::from)
}

/// Retrieve the active reminders of `user_id`, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_active_reminders(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    query_reminders(
        &format!(
            "SELECT {REMINDER_COLUMNS} FROM reminder
             WHERE user_id = ?1 AND is_active = 1
             ORDER BY created_at, id"
        ),
        user_id,
        &[],
        connection,
    )
}

/// Retrieve the active spending limit reminders of `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_active_spending_limits(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    query_reminders(
        &format!(
            "SELECT {REMINDER_COLUMNS} FROM reminder
             WHERE user_id = ?1 AND is_active = 1 AND kind = 'spending_limit'
             ORDER BY id"
        ),
        user_id,
        &[],
        connection,
    )
}

/// Retrieve the active dated reminders of `user_id` that are due on `today`
/// and have not fired yet today.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_unfired_due_reminders(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    query_reminders(
        &format!(
            "SELECT {REMINDER_COLUMNS} FROM reminder
             WHERE user_id = ?1 AND is_active = 1
                AND kind IN ('weekly', 'monthly', 'custom')
                AND next_reminder_date = ?2
                AND (last_fired_date IS NULL OR last_fired_date != ?2)
             ORDER BY id"
        ),
        user_id,
        &[&today],
        connection,
    )
}

/// Retrieve the reminders of `user_id` that fired on `date`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_reminders_fired_on(
    user_id: UserID,
    date: Date,
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    query_reminders(
        &format!(
            "SELECT {REMINDER_COLUMNS} FROM reminder
             WHERE user_id = ?1 AND last_fired_date = ?2
             ORDER BY id"
        ),
        user_id,
        &[&date],
        connection,
    )
}

fn query_reminders(
    query: &str,
    user_id: UserID,
    extra_params: &[&dyn rusqlite::ToSql],
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    let user_id = user_id.as_i64();
    let mut params: Vec<&dyn rusqlite::ToSql> = vec![&user_id];
    params.extend_from_slice(extra_params);

    connection
        .prepare(query)?
        .query_map(params.as_slice(), map_reminder_row)?
        .map(|maybe_reminder| maybe_reminder.map_err(Error::from))
        .collect()
}

/// Record that the reminder `reminder_id` fired on `today`.
///
/// The reminder is marked unread and moved to `next_reminder_date`, or
/// deactivated if `is_active` is false.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the reminder does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_firing(
    reminder_id: ReminderId,
    next_reminder_date: Option<Date>,
    is_active: bool,
    today: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE reminder
         SET next_reminder_date = ?2, is_active = ?3, is_read = 0, last_fired_date = ?4
         WHERE id = ?1",
        rusqlite::params![reminder_id, next_reminder_date, is_active, today],
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Set whether the reminder `reminder_id` owned by `user_id` has been read.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the reminder does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn set_reminder_read(
    user_id: UserID,
    reminder_id: ReminderId,
    is_read: bool,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE reminder SET is_read = ?3 WHERE id = ?1 AND user_id = ?2",
        (reminder_id, user_id.as_i64(), is_read),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the reminder `reminder_id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the reminder does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_reminder(
    user_id: UserID,
    reminder_id: ReminderId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM reminder WHERE id = ?1 AND user_id = ?2",
        (reminder_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Map a database row to a Reminder.
///
/// # Errors
/// Returns an error if a column is missing or has the wrong type.
pub fn map_reminder_row(row: &Row) -> Result<Reminder, rusqlite::Error> {
    Ok(Reminder {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        kind: row.get(4)?,
        limit_amount: row.get(5)?,
        start_date: row.get(6)?,
        next_reminder_date: row.get(7)?,
        reminder_time: row.get(8)?,
        is_active: row.get(9)?,
        is_read: row.get(10)?,
        last_fired_date: row.get(11)?,
        created_at: row.get(12)?,
    })
}
