//! HTTP handlers for the budget endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    AppState, DatabaseId, Error, api,
    budget::{
        db::{BudgetChanges, BudgetFilter, query_budgets, update_budget, upsert_budget},
        model::NewBudget,
    },
    category::Category,
    invalidation::{self, Entity},
    month::Month,
    transaction::validate_amount,
};

/// The body for `POST /budgets`.
///
/// `category` is a display label. When `month` is absent the budget is set
/// for the current month.
#[derive(Debug, Deserialize)]
pub struct UpsertBudgetRequest {
    /// The category display label, e.g. "Groceries".
    pub category: String,
    /// The spending limit for the month.
    pub amount: f64,
    /// The month the budget applies to, as `YYYY-MM`.
    pub month: Option<String>,
}

/// The body for `PUT /budgets/{id}`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBudgetRequest {
    /// A new category display label.
    pub category: Option<String>,
    /// A new amount.
    pub amount: Option<f64>,
    /// A new month, as `YYYY-MM`.
    pub month: Option<String>,
}

/// The query parameters for `GET /budgets`.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetListQuery {
    /// Only include budgets for this `YYYY-MM` month.
    pub month: Option<String>,
    /// Only include budgets with this category display label.
    pub category: Option<String>,
}

/// A route handler for listing budgets with optional month/category filters.
///
/// An unknown category label is ignored rather than rejected, matching the
/// behaviour of filters on the list views.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn list_budgets_endpoint(
    State(state): State<AppState>,
    Query(query): Query<BudgetListQuery>,
) -> Result<Response, Error> {
    let filter = BudgetFilter {
        month: query.month.as_deref().map(str::parse::<Month>).transpose()?,
        category: query.category.as_deref().and_then(Category::from_label),
    };

    let connection = state.db_connection.lock().unwrap();
    let budgets = query_budgets(&filter, &connection)?;

    Ok(api::ok(budgets))
}

/// A route handler for creating a budget, or overwriting the amount of the
/// existing budget for the same category and month.
///
/// Invalidates the cached aggregates for the budget's month.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn upsert_budget_endpoint(
    State(state): State<AppState>,
    Json(request): Json<UpsertBudgetRequest>,
) -> Result<Response, Error> {
    let category = Category::parse_label(&request.category)?;
    let month = match request.month.as_deref() {
        Some(text) => text.parse()?,
        None => Month::current(),
    };
    let new_budget = NewBudget::new(category, request.amount, month)?;

    let connection = state.db_connection.lock().unwrap();
    let budget = upsert_budget(new_budget, &connection)?;
    drop(connection);

    invalidation::invalidate_for(&state.cache, Entity::Budget, &[budget.month]);

    Ok(api::created(budget))
}

/// A route handler for fetching a single budget by ID.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_budget_endpoint(
    State(state): State<AppState>,
    Path(budget_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().unwrap();
    let budget = super::db::get_budget(budget_id, &connection)?;

    Ok(api::ok(budget))
}

/// A route handler for updating a budget.
///
/// Invalidates cached aggregates for both the old and new month when the
/// budget moves across a month boundary.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn update_budget_endpoint(
    State(state): State<AppState>,
    Path(budget_id): Path<DatabaseId>,
    Json(request): Json<UpdateBudgetRequest>,
) -> Result<Response, Error> {
    if let Some(amount) = request.amount {
        validate_amount(amount)?;
    }

    let changes = BudgetChanges {
        category: request
            .category
            .as_deref()
            .map(Category::parse_label)
            .transpose()?,
        amount: request.amount,
        month: request
            .month
            .as_deref()
            .map(str::parse::<Month>)
            .transpose()?,
    };

    let connection = state.db_connection.lock().unwrap();
    let existing = super::db::get_budget(budget_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingBudget,
        other => other,
    })?;
    let updated = update_budget(budget_id, changes, &connection)?;
    drop(connection);

    invalidation::invalidate_for(
        &state.cache,
        Entity::Budget,
        &[existing.month, updated.month],
    );

    Ok(api::ok(updated))
}

/// A route handler for deleting a budget.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    Path(budget_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().unwrap();
    let deleted = super::db::delete_budget(budget_id, &connection)?;
    drop(connection);

    invalidation::invalidate_for(&state.cache, Entity::Budget, &[deleted.month]);

    Ok(api::ok(serde_json::json!({
        "message": "Budget deleted successfully"
    })))
}
