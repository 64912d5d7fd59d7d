//! The transaction details sent by the client and their validation.

use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    transaction::{ExpenseCategory, IncomeType, NewTransaction, TransactionDetails, TransactionType},
};

/// The JSON body for recording a transaction.
///
/// Both the expense and income fields are accepted here so that a request
/// mixing them can be rejected with a clear message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    pub transaction_type: TransactionType,
    pub amount: Option<f64>,
    /// Defaults to today.
    pub date: Option<Date>,
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub income_type: Option<IncomeType>,
    pub note: Option<String>,
}

/// Treat empty text fields as if they were not sent.
fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl TransactionForm {
    /// Check the form and turn it into a transaction that can be stored.
    ///
    /// `today` is used when the form has no date.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] if:
    /// - the amount is missing, negative or not a finite number,
    /// - an expense has no category or carries income fields,
    /// - an income has no source or income type, or carries expense fields.
    pub fn validate(self, today: Date) -> Result<NewTransaction, Error> {
        let amount = self
            .amount
            .ok_or_else(|| Error::Validation("amount is required".to_owned()))?;

        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::Validation(
                "amount must be a non-negative number".to_owned(),
            ));
        }

        let description = non_blank(self.description);
        let source = non_blank(self.source);
        let note = non_blank(self.note);

        let details = match self.transaction_type {
            TransactionType::Expense => {
                if source.is_some() || self.income_type.is_some() || note.is_some() {
                    return Err(Error::Validation(
                        "an expense cannot have a source, incomeType or note".to_owned(),
                    ));
                }

                TransactionDetails::Expense {
                    category: self.category.ok_or_else(|| {
                        Error::Validation("category is required for an expense".to_owned())
                    })?,
                    description,
                }
            }
            TransactionType::Income => {
                if self.category.is_some() || description.is_some() {
                    return Err(Error::Validation(
                        "an income cannot have a category or description".to_owned(),
                    ));
                }

                TransactionDetails::Income {
                    source: source.ok_or_else(|| {
                        Error::Validation("source is required for an income".to_owned())
                    })?,
                    income_type: self.income_type.ok_or_else(|| {
                        Error::Validation("incomeType is required for an income".to_owned())
                    })?,
                    note,
                }
            }
        };

        Ok(NewTransaction {
            amount,
            date: self.date.unwrap_or(today),
            details,
        })
    }
}
