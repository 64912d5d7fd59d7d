//! Income and expense transactions.
//!
//! This module contains:
//! - The [Transaction] model and its expense and income details
//! - Database functions for storing, listing, deleting and totalling transactions
//! - The route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod form;
mod list_endpoint;
mod summary;

pub(crate) use core::text_enum;
pub use core::{
    ExpenseCategory, IncomeType, NewTransaction, Transaction, TransactionDetails,
    TransactionType, create_transaction, create_transaction_table, first_of_month,
    get_monthly_category_totals, sum_expenses_for_period, sum_expenses_since, week_of_month,
};
pub use create_endpoint::{create_transaction_endpoint, record_transaction};
pub use delete_endpoint::delete_transaction_endpoint;
pub use form::TransactionForm;
pub use list_endpoint::list_transactions_endpoint;
pub use summary::get_transaction_summary_endpoint;
