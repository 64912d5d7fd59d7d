//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;
/// Database identifier for a budget.
pub type BudgetId = DatabaseId;
/// Database identifier for a reminder.
pub type ReminderId = DatabaseId;
