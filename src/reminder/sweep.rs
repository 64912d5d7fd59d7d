//! Fires the reminders that are due and checks spending limits.

use rusqlite::Connection;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    database_id::ReminderId,
    reminder::{
        Reminder, ReminderKind,
        db::{
            get_active_spending_limits, get_reminders_fired_on, get_unfired_due_reminders,
            record_firing, set_reminder_read,
        },
        schedule::next_occurrence,
    },
    transaction::{first_of_month, sum_expenses_since},
};

/// Fire the dated reminders of `user_id` that are due on `today`.
///
/// Weekly and monthly reminders move on to their next date, custom reminders
/// are deactivated. Each fired reminder is marked unread.
///
/// Returns every reminder that fired on `today`, including those fired by an
/// earlier sweep on the same day. Sweeping twice on one day fires nothing new.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn due_today_sweep(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Reminder>, Error> {
    for reminder in get_unfired_due_reminders(user_id, today, connection)? {
        let (next_reminder_date, is_active) = match (reminder.kind, reminder.start_date) {
            (ReminderKind::Weekly | ReminderKind::Monthly, Some(start_date)) => {
                (next_occurrence(reminder.kind, today, start_date), true)
            }
            _ => (reminder.next_reminder_date, false),
        };

        tracing::debug!(
            "Reminder {} fired on {today}, next on {next_reminder_date:?}",
            reminder.id
        );
        record_firing(reminder.id, next_reminder_date, is_active, today, connection)?;
    }

    get_reminders_fired_on(user_id, today, connection)
}

/// A spending limit that the month's expenses have gone over.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingLimitAlert {
    pub reminder_id: ReminderId,
    pub title: String,
    pub limit_amount: f64,
    pub current_spent: f64,
    pub is_exceeded: bool,
}

/// Compare the expenses of `user_id` since the start of the month of `today`
/// against each active spending limit.
///
/// Each exceeded limit is marked unread and reported.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn spending_limit_evaluation(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<SpendingLimitAlert>, Error> {
    let limits = get_active_spending_limits(user_id, connection)?;
    if limits.is_empty() {
        return Ok(Vec::new());
    }

    let month_start = first_of_month(today.year(), u8::from(today.month()))?;
    let current_spent = sum_expenses_since(user_id, month_start, connection)?;

    let mut alerts = Vec::new();
    for reminder in limits {
        let limit_amount = reminder.limit_amount.unwrap_or_default();
        if current_spent <= limit_amount {
            continue;
        }

        set_reminder_read(user_id, reminder.id, false, connection)?;
        alerts.push(SpendingLimitAlert {
            reminder_id: reminder.id,
            title: reminder.title,
            limit_amount,
            current_spent,
            is_exceeded: true,
        });
    }

    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        auth::UserID,
        reminder::{
            NewReminder, ReminderKind,
            db::{create_reminder, get_reminder, set_reminder_read},
            schedule::first_occurrence,
            sweep::{SpendingLimitAlert, due_today_sweep, spending_limit_evaluation},
        },
        test_utils::{create_test_user, get_test_connection},
        transaction::{ExpenseCategory, NewTransaction, TransactionDetails, create_transaction},
    };

    fn setup() -> (Connection, UserID) {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        (connection, user.id)
    }

    fn dated(kind: ReminderKind, start_date: Date) -> NewReminder {
        NewReminder {
            title: format!("{kind} reminder"),
            description: String::new(),
            kind,
            limit_amount: None,
            start_date: Some(start_date),
            next_reminder_date: first_occurrence(kind, start_date),
            reminder_time: Some("09:00".to_owned()),
        }
    }

    fn spending_limit(limit_amount: f64) -> NewReminder {
        NewReminder {
            title: "Monthly cap".to_owned(),
            description: String::new(),
            kind: ReminderKind::SpendingLimit,
            limit_amount: Some(limit_amount),
            start_date: None,
            next_reminder_date: None,
            reminder_time: None,
        }
    }

    fn add_expense(user_id: UserID, amount: f64, date: Date, conn: &Connection) {
        create_transaction(
            user_id,
            &NewTransaction {
                amount,
                date,
                details: TransactionDetails::Expense {
                    category: ExpenseCategory::Food,
                    description: None,
                },
            },
            conn,
        )
        .unwrap();
    }

    #[test]
    fn weekly_reminder_fires_and_advances() {
        let (conn, user_id) = setup();
        let reminder =
            create_reminder(user_id, &dated(ReminderKind::Weekly, date!(2024 - 03 - 01)), &conn)
                .unwrap();
        set_reminder_read(user_id, reminder.id, true, &conn).unwrap();

        assert!(
            due_today_sweep(user_id, date!(2024 - 03 - 07), &conn)
                .unwrap()
                .is_empty()
        );

        let fired = due_today_sweep(user_id, date!(2024 - 03 - 08), &conn).unwrap();

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].next_reminder_date, Some(date!(2024 - 03 - 15)));
        assert_eq!(fired[0].last_fired_date, Some(date!(2024 - 03 - 08)));
        assert!(fired[0].is_active);
        assert!(!fired[0].is_read);
    }

    #[test]
    fn sweep_is_idempotent_within_a_day() {
        let (conn, user_id) = setup();
        create_reminder(user_id, &dated(ReminderKind::Weekly, date!(2024 - 03 - 01)), &conn)
            .unwrap();
        let today = date!(2024 - 03 - 08);

        let first = due_today_sweep(user_id, today, &conn).unwrap();
        let second = due_today_sweep(user_id, today, &conn).unwrap();

        assert_eq!(first, second);
        assert_eq!(second[0].next_reminder_date, Some(date!(2024 - 03 - 15)));
    }

    #[test]
    fn monthly_reminder_keeps_its_anchor_day() {
        let (conn, user_id) = setup();
        let reminder =
            create_reminder(user_id, &dated(ReminderKind::Monthly, date!(2024 - 01 - 31)), &conn)
                .unwrap();
        assert_eq!(reminder.next_reminder_date, Some(date!(2024 - 02 - 29)));

        let fired = due_today_sweep(user_id, date!(2024 - 02 - 29), &conn).unwrap();
        assert_eq!(fired[0].next_reminder_date, Some(date!(2024 - 03 - 31)));

        let fired = due_today_sweep(user_id, date!(2024 - 03 - 31), &conn).unwrap();
        assert_eq!(fired[0].next_reminder_date, Some(date!(2024 - 04 - 30)));
    }

    #[test]
    fn custom_reminder_fires_once_then_deactivates() {
        let (conn, user_id) = setup();
        let reminder =
            create_reminder(user_id, &dated(ReminderKind::Custom, date!(2024 - 05 - 20)), &conn)
                .unwrap();

        let fired = due_today_sweep(user_id, date!(2024 - 05 - 20), &conn).unwrap();

        assert_eq!(fired.len(), 1);
        assert!(!fired[0].is_active);
        assert!(!get_reminder(user_id, reminder.id, &conn).unwrap().is_active);
        assert!(
            due_today_sweep(user_id, date!(2024 - 05 - 21), &conn)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn spending_limit_reminders_never_fire_in_sweep() {
        let (conn, user_id) = setup();
        create_reminder(user_id, &spending_limit(10.0), &conn).unwrap();

        assert!(
            due_today_sweep(user_id, date!(2024 - 03 - 08), &conn)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn exceeded_spending_limit_is_reported_and_marked_unread() {
        let (conn, user_id) = setup();
        let reminder = create_reminder(user_id, &spending_limit(100.0), &conn).unwrap();
        set_reminder_read(user_id, reminder.id, true, &conn).unwrap();
        add_expense(user_id, 500.0, date!(2024 - 02 - 28), &conn);
        add_expense(user_id, 60.0, date!(2024 - 03 - 01), &conn);
        add_expense(user_id, 50.0, date!(2024 - 03 - 09), &conn);

        let alerts = spending_limit_evaluation(user_id, date!(2024 - 03 - 10), &conn).unwrap();

        assert_eq!(
            alerts,
            vec![SpendingLimitAlert {
                reminder_id: reminder.id,
                title: "Monthly cap".to_owned(),
                limit_amount: 100.0,
                current_spent: 110.0,
                is_exceeded: true,
            }]
        );
        assert!(!get_reminder(user_id, reminder.id, &conn).unwrap().is_read);
    }

    #[test]
    fn spending_at_the_limit_is_not_reported() {
        let (conn, user_id) = setup();
        let reminder = create_reminder(user_id, &spending_limit(100.0), &conn).unwrap();
        set_reminder_read(user_id, reminder.id, true, &conn).unwrap();
        add_expense(user_id, 100.0, date!(2024 - 03 - 02), &conn);

        let alerts = spending_limit_evaluation(user_id, date!(2024 - 03 - 10), &conn).unwrap();

        assert!(alerts.is_empty());
        assert!(get_reminder(user_id, reminder.id, &conn).unwrap().is_read);
    }
}
