//! The transaction domain model and its validation rules.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{DatabaseId, Error, category::Category};

/// The longest allowed transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// The largest allowed transaction or budget amount.
pub const MAX_AMOUNT: f64 = 999_999.0;

/// An expense or income, i.e. an event where money was either spent or
/// earned.
///
/// Amounts are validated to be positive at the API boundary; aggregation
/// still uses the absolute value so rows imported with another sign
/// convention total correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// The calendar date the transaction happened on.
    pub date: Date,
    /// The category the transaction belongs to.
    pub category: Category,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub(crate) description: String,
    pub(crate) amount: f64,
    pub(crate) date: Date,
    pub(crate) category: Category,
}

impl NewTransaction {
    /// Validate the fields for a new transaction.
    ///
    /// # Errors
    /// Returns [Error::EmptyDescription] or [Error::DescriptionTooLong] for
    /// a bad description, and [Error::AmountOutOfRange] for an amount
    /// outside (0, [MAX_AMOUNT]].
    pub fn new(
        description: &str,
        amount: f64,
        date: Date,
        category: Category,
    ) -> Result<NewTransaction, Error> {
        let description = description.trim();
        validate_description(description)?;
        validate_amount(amount)?;

        Ok(NewTransaction {
            description: description.to_owned(),
            amount,
            date,
            category,
        })
    }
}

/// Check that a description is non-empty and at most
/// [MAX_DESCRIPTION_LENGTH] characters.
pub(crate) fn validate_description(description: &str) -> Result<(), Error> {
    if description.trim().is_empty() {
        return Err(Error::EmptyDescription);
    }

    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooLong(MAX_DESCRIPTION_LENGTH));
    }

    Ok(())
}

/// Check that an amount is in (0, [MAX_AMOUNT]].
pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() || amount <= 0.0 || amount > MAX_AMOUNT {
        return Err(Error::AmountOutOfRange(MAX_AMOUNT));
    }

    Ok(())
}
