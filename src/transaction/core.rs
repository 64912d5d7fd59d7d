//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, ToSql};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, auth::UserID, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// The closed set of categories an expense can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Food,
    Transport,
    Bills,
    Shopping,
    Health,
    Others,
}

/// Where a piece of income came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeType {
    Salary,
    Bonus,
    Investment,
    Freelance,
    Gift,
    Other,
}

/// Implements the string conversions and SQLite TEXT mapping for a fieldless enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The name used for this value in JSON and in the database.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::Error::Validation(format!(
                        "\"{other}\" is not a valid {}",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl rusqlite::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value.as_str()?.parse().map_err(|error: $crate::Error| {
                    rusqlite::types::FromSqlError::Other(error.to_string().into())
                })
            }
        }
    };
}

pub(crate) use text_enum;

text_enum!(TransactionType {
    Income => "income",
    Expense => "expense",
});

text_enum!(ExpenseCategory {
    Food => "Food",
    Transport => "Transport",
    Bills => "Bills",
    Shopping => "Shopping",
    Health => "Health",
    Others => "Others",
});

text_enum!(IncomeType {
    Salary => "Salary",
    Bonus => "Bonus",
    Investment => "Investment",
    Freelance => "Freelance",
    Gift => "Gift",
    Other => "Other",
});

/// The fields that only apply to one type of transaction.
///
/// Serialized inline with the `transactionType` tag, so an expense never
/// carries income fields and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "transactionType", rename_all = "lowercase")]
pub enum TransactionDetails {
    Expense {
        category: ExpenseCategory,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Income {
        source: String,
        #[serde(rename = "incomeType")]
        income_type: IncomeType,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl TransactionDetails {
    /// The type tag of these details.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionDetails::Expense { .. } => TransactionType::Expense,
            TransactionDetails::Income { .. } => TransactionType::Income,
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// When the transaction happened.
    pub date: Date,
    #[serde(flatten)]
    pub details: TransactionDetails,
    /// The week of the month, 1 to 5, derived from `date`.
    pub week: u8,
    /// The month, 1 to 12, derived from `date`.
    pub month: u8,
    /// The year, derived from `date`.
    pub year: i32,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: f64,
    pub date: Date,
    pub details: TransactionDetails,
}

/// The week of the month that `date` falls in, where days 1-7 are week 1.
pub fn week_of_month(date: Date) -> u8 {
    date.day().div_ceil(7)
}

/// The first day of the month `month` in `year`.
///
/// # Errors
///
/// Returns an [Error::Validation] if `month` is not between 1 and 12.
pub fn first_of_month(year: i32, month: u8) -> Result<Date, Error> {
    let month = Month::try_from(month)
        .map_err(|_| Error::Validation(format!("month must be between 1 and 12, got {month}")))?;

    Date::from_calendar_date(year, month, 1)
        .map_err(|error| Error::Validation(format!("invalid date: {error}")))
}

/// The per-category expense total for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCategoryTotal {
    pub year: i32,
    pub month: u8,
    pub category: ExpenseCategory,
    pub total: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
                amount REAL NOT NULL CHECK (amount >= 0),
                date TEXT NOT NULL,
                category TEXT,
                description TEXT,
                source TEXT,
                income_type TEXT,
                note TEXT,
                week INTEGER NOT NULL,
                month INTEGER NOT NULL,
                year INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the budget ledger sums.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_period
         ON \"transaction\"(user_id, transaction_type, year, month, category);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database.
///
/// The week, month and year are derived from the transaction date.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let (category, description, source, income_type, note) = match &new_transaction.details {
        TransactionDetails::Expense {
            category,
            description,
        } => (Some(*category), description.as_deref(), None, None, None),
        TransactionDetails::Income {
            source,
            income_type,
            note,
        } => (
            None,
            None,
            Some(source.as_str()),
            Some(*income_type),
            note.as_deref(),
        ),
    };
    let date = new_transaction.date;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (user_id, transaction_type, amount, date, category, description, source,
                 income_type, note, week, month, year)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             RETURNING id, user_id, transaction_type, amount, date, category, description,
                source, income_type, note, week, month, year",
        )?
        .query_row(
            rusqlite::params![
                user_id.as_i64(),
                new_transaction.details.transaction_type(),
                new_transaction.amount,
                date,
                category,
                description,
                source,
                income_type,
                note,
                week_of_month(date),
                u8::from(date.month()),
                date.year(),
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transactions of `user_id`, newest first.
///
/// If `transaction_type` is given, only transactions of that type are returned.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_transactions(
    user_id: UserID,
    transaction_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut query = String::from(
        "SELECT id, user_id, transaction_type, amount, date, category, description, source,
            income_type, note, week, month, year
         FROM \"transaction\" WHERE user_id = ?1",
    );
    let user_id = user_id.as_i64();
    let mut params: Vec<&dyn ToSql> = vec![&user_id];

    if let Some(transaction_type) = &transaction_type {
        query.push_str(" AND transaction_type = ?2");
        params.push(transaction_type);
    }

    query.push_str(" ORDER BY date DESC, id DESC");

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Delete the transaction `transaction_id` owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the transaction does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    user_id: UserID,
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Sum the amounts of the expenses of `user_id` in `category` for the given month.
///
/// Returns zero if there are no such expenses.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn sum_expenses_for_period(
    user_id: UserID,
    category: ExpenseCategory,
    month: u8,
    year: i32,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND transaction_type = 'expense'
                AND category = ?2 AND month = ?3 AND year = ?4",
            (user_id.as_i64(), category, month, year),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Sum the amounts of all expenses of `user_id` dated on or after `since`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn sum_expenses_since(
    user_id: UserID,
    since: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND transaction_type = 'expense' AND date >= ?2",
            (user_id.as_i64(), since),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Get the expense totals of `user_id` grouped by month and category for
/// every expense dated on or after `since`, oldest month first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn get_monthly_category_totals(
    user_id: UserID,
    since: Date,
    connection: &Connection,
) -> Result<Vec<MonthlyCategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT year, month, category, SUM(amount) FROM \"transaction\"
             WHERE user_id = ?1 AND transaction_type = 'expense' AND date >= ?2
             GROUP BY year, month, category
             ORDER BY year, month, category",
        )?
        .query_map((user_id.as_i64(), since), |row| {
            Ok(MonthlyCategoryTotal {
                year: row.get(0)?,
                month: row.get(1)?,
                category: row.get(2)?,
                total: row.get(3)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// Map a database row to a Transaction.
///
/// # Errors
/// Returns an error if a column is missing, has the wrong type, or the
/// type-specific columns are inconsistent with the transaction type.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let transaction_type: TransactionType = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;

    let details = match transaction_type {
        TransactionType::Expense => TransactionDetails::Expense {
            category: row.get(5)?,
            description: row.get(6)?,
        },
        TransactionType::Income => TransactionDetails::Income {
            source: row.get(7)?,
            income_type: row.get(8)?,
            note: row.get(9)?,
        },
    };

    Ok(Transaction {
        id,
        user_id,
        amount,
        date,
        details,
        week: row.get(10)?,
        month: row.get(11)?,
        year: row.get(12)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
