//! Database operations for budgets.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::OffsetDateTime;

use crate::{
    DatabaseId, Error,
    budget::model::{Budget, NewBudget},
    category::Category,
    month::Month,
};

/// Optional filters applied to budget list queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetFilter {
    /// Only include budgets for this month.
    pub month: Option<Month>,
    /// Only include budgets for this category.
    pub category: Option<Category>,
}

/// The fields of a budget that an update may change.
///
/// Fields left as `None` keep their stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetChanges {
    /// A new category.
    pub category: Option<Category>,
    /// A new amount.
    pub amount: Option<f64>,
    /// A new month.
    pub month: Option<Month>,
}

/// Initialize the budget table and its indexes.
///
/// The UNIQUE constraint on (category, month) backs the upsert semantics of
/// `POST /budgets`.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            month TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(category, month)
        );

        CREATE INDEX IF NOT EXISTS idx_budget_month ON budget(month);",
    )?;

    Ok(())
}

/// Insert a budget, or overwrite the amount of the existing budget for the
/// same (category, month) pair.
pub fn upsert_budget(budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    let stored = connection
        .prepare(
            "INSERT INTO budget (category, amount, month, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(category, month) DO UPDATE SET amount = excluded.amount
             RETURNING id, category, amount, month, created_at",
        )?
        .query_row(
            (
                budget.category.code(),
                budget.amount,
                budget.month.to_string(),
                OffsetDateTime::now_utc(),
            ),
            map_row,
        )?;

    Ok(stored)
}

/// Retrieve a single budget by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a stored budget.
pub fn get_budget(id: DatabaseId, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare("SELECT id, category, amount, month, created_at FROM budget WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Query budgets matching `filter`, newest first.
pub fn query_budgets(filter: &BudgetFilter, connection: &Connection) -> Result<Vec<Budget>, Error> {
    let mut clause_parts = vec![];
    let mut parameters = vec![];

    if let Some(month) = filter.month {
        clause_parts.push(format!("month = ?{}", parameters.len() + 1));
        parameters.push(Value::Text(month.to_string()));
    }

    if let Some(category) = filter.category {
        clause_parts.push(format!("category = ?{}", parameters.len() + 1));
        parameters.push(Value::Text(category.code().to_owned()));
    }

    let where_clause = if clause_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clause_parts.join(" AND "))
    };

    let query = format!(
        "SELECT id, category, amount, month, created_at FROM budget\
         {where_clause} ORDER BY created_at DESC, id DESC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::SqlError))
        .collect()
}

/// Apply `changes` to a stored budget and return the updated row.
///
/// # Errors
/// Returns [Error::UpdateMissingBudget] if `id` does not refer to a stored
/// budget, and [Error::DuplicateBudget] if the change would collide with
/// another budget's (category, month) pair.
pub fn update_budget(
    id: DatabaseId,
    changes: BudgetChanges,
    connection: &Connection,
) -> Result<Budget, Error> {
    let existing = get_budget(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingBudget,
        other => other,
    })?;

    let category = changes.category.unwrap_or(existing.category);
    let amount = changes.amount.unwrap_or(existing.amount);
    let month = changes.month.unwrap_or(existing.month);

    connection.execute(
        "UPDATE budget SET category = ?1, amount = ?2, month = ?3 WHERE id = ?4",
        (category.code(), amount, month.to_string(), id),
    )?;

    Ok(Budget {
        id,
        category,
        amount,
        month,
        created_at: existing.created_at,
    })
}

/// Delete a budget by ID and return the deleted row.
///
/// # Errors
/// Returns [Error::DeleteMissingBudget] if `id` does not refer to a stored
/// budget.
pub fn delete_budget(id: DatabaseId, connection: &Connection) -> Result<Budget, Error> {
    let existing = get_budget(id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingBudget,
        other => other,
    })?;

    connection.execute("DELETE FROM budget WHERE id = ?1", [id])?;

    Ok(existing)
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_category: String = row.get(1)?;
    let raw_month: String = row.get(3)?;
    let month = raw_month.parse().map_err(|error: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    Ok(Budget {
        id: row.get(0)?,
        category: Category::from_code(&raw_category),
        amount: row.get(2)?,
        month,
        created_at: row.get(4)?,
    })
}
