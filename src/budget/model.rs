//! The budget domain model and its validation rules.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    DatabaseId, Error,
    category::Category,
    month::Month,
    transaction::validate_amount,
};

/// A monthly spending limit for one category.
///
/// At most one budget exists per (category, month) pair; creating a
/// duplicate overwrites the amount instead of erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// The ID of the budget.
    pub id: DatabaseId,
    /// The category the limit applies to.
    pub category: Category,
    /// The spending limit.
    pub amount: f64,
    /// The calendar month the limit applies to.
    pub month: Month,
    /// When the budget was first created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated budget that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub(crate) category: Category,
    pub(crate) amount: f64,
    pub(crate) month: Month,
}

impl NewBudget {
    /// Validate the fields for a new budget.
    ///
    /// # Errors
    /// Returns [Error::AmountOutOfRange] for an amount outside
    /// (0, [MAX_AMOUNT](crate::transaction::MAX_AMOUNT)].
    pub fn new(category: Category, amount: f64, month: Month) -> Result<NewBudget, Error> {
        validate_amount(amount)?;

        Ok(NewBudget {
            category,
            amount,
            month,
        })
    }
}
