//! Works out when a reminder should next fire.

use time::{Date, Duration, Month};

use crate::reminder::ReminderKind;

/// The date a reminder fires after `from`.
///
/// - Weekly reminders fire seven days later.
/// - Monthly reminders fire one calendar month later on the day of
///   `start_date`, or the last day of the month if it is shorter.
/// - Custom reminders fire once, on `start_date`.
/// - Spending limit reminders are not scheduled and return `None`.
pub fn next_occurrence(kind: ReminderKind, from: Date, start_date: Date) -> Option<Date> {
    match kind {
        ReminderKind::Weekly => from.checked_add(Duration::weeks(1)),
        ReminderKind::Monthly => add_month(from, start_date.day()),
        ReminderKind::Custom => Some(start_date),
        ReminderKind::SpendingLimit => None,
    }
}

/// The first date a newly created reminder fires.
pub fn first_occurrence(kind: ReminderKind, start_date: Date) -> Option<Date> {
    next_occurrence(kind, start_date, start_date)
}

fn add_month(from: Date, anchor_day: u8) -> Option<Date> {
    let (year, month) = match from.month() {
        Month::December => (from.year().checked_add(1)?, Month::January),
        month => (from.year(), month.next()),
    };
    let day = anchor_day.min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}

/// The number of the last day in `month` of `year`.
pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::date};

    use crate::reminder::{
        ReminderKind,
        schedule::{first_occurrence, last_day_of_month, next_occurrence},
    };

    #[test]
    fn weekly_fires_a_week_after_start() {
        let start = date!(2024 - 03 - 01);

        let first = first_occurrence(ReminderKind::Weekly, start).unwrap();
        let second = next_occurrence(ReminderKind::Weekly, first, start).unwrap();

        assert_eq!(first, date!(2024 - 03 - 08));
        assert_eq!(second, date!(2024 - 03 - 15));
    }

    #[test]
    fn monthly_clamps_to_end_of_short_month() {
        let start = date!(2024 - 01 - 31);

        let first = first_occurrence(ReminderKind::Monthly, start).unwrap();
        let second = next_occurrence(ReminderKind::Monthly, first, start).unwrap();
        let third = next_occurrence(ReminderKind::Monthly, second, start).unwrap();

        assert_eq!(first, date!(2024 - 02 - 29));
        assert_eq!(second, date!(2024 - 03 - 31));
        assert_eq!(third, date!(2024 - 04 - 30));
    }

    #[test]
    fn monthly_in_non_leap_year() {
        let start = date!(2023 - 01 - 30);

        assert_eq!(
            first_occurrence(ReminderKind::Monthly, start),
            Some(date!(2023 - 02 - 28))
        );
    }

    #[test]
    fn monthly_rolls_over_the_year() {
        let start = date!(2024 - 12 - 15);

        assert_eq!(
            first_occurrence(ReminderKind::Monthly, start),
            Some(date!(2025 - 01 - 15))
        );
    }

    #[test]
    fn custom_fires_on_start_date() {
        let start = date!(2024 - 05 - 20);

        assert_eq!(first_occurrence(ReminderKind::Custom, start), Some(start));
        assert_eq!(
            next_occurrence(ReminderKind::Custom, date!(2024 - 06 - 01), start),
            Some(start)
        );
    }

    #[test]
    fn spending_limit_is_never_scheduled() {
        assert_eq!(
            first_occurrence(ReminderKind::SpendingLimit, date!(2024 - 05 - 20)),
            None
        );
    }

    #[test]
    fn last_day_handles_leap_years() {
        assert_eq!(last_day_of_month(2024, Month::February), 29);
        assert_eq!(last_day_of_month(2023, Month::February), 28);
        assert_eq!(last_day_of_month(1900, Month::February), 28);
        assert_eq!(last_day_of_month(2000, Month::February), 29);
        assert_eq!(last_day_of_month(2024, Month::April), 30);
        assert_eq!(last_day_of_month(2024, Month::December), 31);
    }
}
