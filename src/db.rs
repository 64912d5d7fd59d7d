//! Sets up the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, auth::create_user_table, budget::create_budget_table,
    reminder::create_reminder_table, transaction::create_transaction_table,
};

/// Create the tables for every domain model if they do not already exist.
///
/// Foreign keys are enabled on `connection` and the tables are created in a
/// single exclusive transaction.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_reminder_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::db::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let mut tables: Vec<String> = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map((), |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();
        tables.sort();

        assert_eq!(tables, ["budget", "reminder", "transaction", "user"]);
    }

    #[test]
    fn initialize_is_repeatable() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        assert_eq!(initialize(&connection), Ok(()));
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let result = connection.execute(
            "INSERT INTO reminder (user_id, title, kind, created_at)
             VALUES (999, 'Orphan', 'custom', '2024-01-01')",
            (),
        );

        assert!(result.is_err());
    }
}
