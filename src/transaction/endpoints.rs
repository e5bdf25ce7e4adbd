//! HTTP handlers for the transaction endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    AppState, DatabaseId, Error, api,
    category::Category,
    invalidation::{self, Entity},
    month::Month,
    pagination::{PageRequest, Pagination},
    transaction::{
        db::{
            TransactionChanges, TransactionFilter, count_transactions, create_transaction,
            delete_transaction, get_transaction, query_transactions, update_transaction,
        },
        model::{NewTransaction, Transaction, validate_amount, validate_description},
    },
};

/// The body for `POST /transactions`.
///
/// `category` is a display label and `date` is a `YYYY-MM-DD` string; both
/// are translated/parsed at this boundary so that failures surface as
/// per-field validation errors.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Text detailing the transaction.
    pub description: String,
    /// The value of the transaction.
    pub amount: f64,
    /// The date the transaction happened on, as `YYYY-MM-DD`.
    pub date: String,
    /// The category display label, e.g. "Food & Dining".
    pub category: String,
}

/// The body for `PUT /transactions/{id}`. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    /// A new description.
    pub description: Option<String>,
    /// A new amount.
    pub amount: Option<f64>,
    /// A new date, as `YYYY-MM-DD`.
    pub date: Option<String>,
    /// A new category display label.
    pub category: Option<String>,
}

/// The query parameters for `GET /transactions`.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListQuery {
    /// The 1-based page to return.
    pub page: Option<u64>,
    /// The number of rows per page.
    pub limit: Option<u64>,
    /// Only include transactions with this category display label.
    pub category: Option<String>,
    /// Only include transactions in this `YYYY-MM` month.
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
struct TransactionListData {
    transactions: Vec<Transaction>,
    pagination: Pagination,
}

/// A route handler for listing transactions with optional category/month
/// filters and pagination.
///
/// An unknown category label is ignored rather than rejected, matching the
/// behaviour of filters on the list views.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Response, Error> {
    let page_request = PageRequest::new(query.page, query.limit)?;

    let filter = TransactionFilter {
        category: query.category.as_deref().and_then(Category::from_label),
        month: query.month.as_deref().map(str::parse::<Month>).transpose()?,
    };

    let connection = state.db_connection.lock().unwrap();
    let transactions = query_transactions(
        &filter,
        Some(page_request.limit),
        page_request.offset(),
        &connection,
    )?;
    let total = count_transactions(&filter, &connection)?;

    Ok(api::ok(TransactionListData {
        transactions,
        pagination: Pagination::describe(page_request, total),
    }))
}

/// A route handler for creating a new transaction.
///
/// Invalidates the cached aggregates for the transaction's month.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<Response, Error> {
    let category = Category::parse_label(&request.category)?;
    let date = parse_date(&request.date)?;
    let new_transaction = NewTransaction::new(&request.description, request.amount, date, category)?;

    let connection = state.db_connection.lock().unwrap();
    let transaction = create_transaction(new_transaction, &connection)?;
    drop(connection);

    invalidation::invalidate_for(
        &state.cache,
        Entity::Transaction,
        &[Month::containing(transaction.date)],
    );

    Ok(api::created(transaction))
}

/// A route handler for fetching a single transaction by ID.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().unwrap();
    let transaction = get_transaction(transaction_id, &connection)?;

    Ok(api::ok(transaction))
}

/// A route handler for updating a transaction.
///
/// Invalidates cached aggregates for both the old and new month when the
/// date moves across a month boundary.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn update_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<DatabaseId>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Response, Error> {
    if let Some(ref description) = request.description {
        validate_description(description)?;
    }

    if let Some(amount) = request.amount {
        validate_amount(amount)?;
    }

    let changes = TransactionChanges {
        description: request.description,
        amount: request.amount,
        date: request.date.as_deref().map(parse_date).transpose()?,
        category: request
            .category
            .as_deref()
            .map(Category::parse_label)
            .transpose()?,
    };

    let connection = state.db_connection.lock().unwrap();
    let existing = get_transaction(transaction_id, &connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        other => other,
    })?;
    let updated = update_transaction(transaction_id, changes, &connection)?;
    drop(connection);

    invalidation::invalidate_for(
        &state.cache,
        Entity::Transaction,
        &[
            Month::containing(existing.date),
            Month::containing(updated.date),
        ],
    );

    Ok(api::ok(updated))
}

/// A route handler for deleting a transaction.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn delete_transaction_endpoint(
    State(state): State<AppState>,
    Path(transaction_id): Path<DatabaseId>,
) -> Result<Response, Error> {
    let connection = state.db_connection.lock().unwrap();
    let deleted = delete_transaction(transaction_id, &connection)?;
    drop(connection);

    invalidation::invalidate_for(
        &state.cache,
        Entity::Transaction,
        &[Month::containing(deleted.date)],
    );

    Ok(api::ok(serde_json::json!({
        "message": "Transaction deleted successfully"
    })))
}

fn parse_date(text: &str) -> Result<Date, Error> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(text, format).map_err(|_| Error::InvalidDate(text.to_owned()))
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use axum::{
        Json,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    use rusqlite::Connection;
    use time::macros::date;

    use super::{
        CreateTransactionRequest, TransactionListQuery, UpdateTransactionRequest,
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    };
    use crate::{
        AppState, Error,
        cache::dashboard_key,
        category::Category,
        month::Month,
        transaction::{NewTransaction, create_transaction},
    };

    fn get_test_state() -> AppState {
        let connection = Connection::open_in_memory().unwrap();
        AppState::new(connection).expect("Could not create app state")
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn seed_transaction(state: &AppState, amount: f64, date: time::Date, category: Category) {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            NewTransaction::new("seeded", amount, date, category).unwrap(),
            &connection,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn create_returns_created_transaction() {
        let state = get_test_state();

        let request = CreateTransactionRequest {
            description: "Grocery shopping".to_string(),
            amount: 85.5,
            date: "2024-03-15".to_string(),
            category: "Groceries".to_string(),
        };

        let response = create_transaction_endpoint(State(state), Json(request))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["description"], "Grocery shopping");
        assert_eq!(body["data"]["category"], "Groceries");
        assert_eq!(body["data"]["date"], "2024-03-15");
    }

    #[tokio::test]
    async fn create_rejects_unknown_category_label() {
        let state = get_test_state();

        let request = CreateTransactionRequest {
            description: "mystery".to_string(),
            amount: 10.0,
            date: "2024-03-15".to_string(),
            category: "Gambling".to_string(),
        };

        let response = create_transaction_endpoint(State(state), Json(request))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "category");
    }

    #[tokio::test]
    async fn create_rejects_negative_amount() {
        let state = get_test_state();

        let request = CreateTransactionRequest {
            description: "refund".to_string(),
            amount: -50.0,
            date: "2024-03-15".to_string(),
            category: "Shopping".to_string(),
        };

        let response = create_transaction_endpoint(State(state), Json(request))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "amount");
    }

    #[tokio::test]
    async fn create_rejects_malformed_date() {
        let state = get_test_state();

        let request = CreateTransactionRequest {
            description: "coffee".to_string(),
            amount: 4.5,
            date: "15/03/2024".to_string(),
            category: "Food & Dining".to_string(),
        };

        let response = create_transaction_endpoint(State(state), Json(request))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"][0]["field"], "date");
    }

    #[tokio::test]
    async fn create_invalidates_dashboard_cache_for_month() {
        let state = get_test_state();
        let month: Month = "2024-03".parse().unwrap();
        state
            .cache
            .set(&dashboard_key(month), "{}", std::time::Duration::from_secs(300))
            .unwrap();

        let request = CreateTransactionRequest {
            description: "coffee".to_string(),
            amount: 4.5,
            date: "2024-03-15".to_string(),
            category: "Food & Dining".to_string(),
        };

        create_transaction_endpoint(State(state.clone()), Json(request))
            .await
            .unwrap();

        assert_eq!(state.cache.get(&dashboard_key(month)).unwrap(), None);
    }

    #[tokio::test]
    async fn list_paginates_120_rows_into_3_pages() {
        let state = get_test_state();
        for i in 0..120 {
            seed_transaction(
                &state,
                1.0 + i as f64,
                date!(2024 - 03 - 01),
                Category::Groceries,
            );
        }

        let query = TransactionListQuery {
            page: Some(2),
            limit: Some(50),
            ..Default::default()
        };
        let response = list_transactions_endpoint(State(state), Query(query))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 50);
        assert_eq!(body["data"]["pagination"]["page"], 2);
        assert_eq!(body["data"]["pagination"]["total"], 120);
        assert_eq!(body["data"]["pagination"]["pages"], 3);
    }

    #[tokio::test]
    async fn list_filters_by_category_label_and_month() {
        let state = get_test_state();
        seed_transaction(&state, 10.0, date!(2024 - 03 - 01), Category::Groceries);
        seed_transaction(&state, 20.0, date!(2024 - 03 - 01), Category::Rent);
        seed_transaction(&state, 30.0, date!(2024 - 04 - 01), Category::Groceries);

        let query = TransactionListQuery {
            category: Some("Groceries".to_string()),
            month: Some("2024-03".to_string()),
            ..Default::default()
        };
        let response = list_transactions_endpoint(State(state), Query(query))
            .await
            .into_response();

        let body = body_json(response).await;
        let transactions = body["data"]["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["amount"], 10.0);
    }

    #[tokio::test]
    async fn list_ignores_unknown_category_label() {
        let state = get_test_state();
        seed_transaction(&state, 10.0, date!(2024 - 03 - 01), Category::Groceries);

        let query = TransactionListQuery {
            category: Some("Not A Category".to_string()),
            ..Default::default()
        };
        let response = list_transactions_endpoint(State(state), Query(query))
            .await
            .into_response();

        let body = body_json(response).await;
        assert_eq!(body["data"]["transactions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_rejects_malformed_month() {
        let state = get_test_state();

        let query = TransactionListQuery {
            month: Some("March".to_string()),
            ..Default::default()
        };
        let response = list_transactions_endpoint(State(state), Query(query))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_missing_transaction_returns_404() {
        let state = get_test_state();

        let response = get_transaction_endpoint(State(state), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_moves_transaction_between_months() {
        let state = get_test_state();
        seed_transaction(&state, 50.0, date!(2024 - 03 - 15), Category::Groceries);

        let request = UpdateTransactionRequest {
            date: Some("2024-04-02".to_string()),
            ..Default::default()
        };
        let response = update_transaction_endpoint(State(state), Path(1), Json(request))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["data"]["date"], "2024-04-02");
        assert_eq!(body["data"]["amount"], 50.0);
    }

    #[tokio::test]
    async fn update_moving_months_invalidates_both_snapshots() {
        let state = get_test_state();
        seed_transaction(&state, 50.0, date!(2024 - 03 - 15), Category::Groceries);
        let march: Month = "2024-03".parse().unwrap();
        let april: Month = "2024-04".parse().unwrap();
        let ttl = std::time::Duration::from_secs(300);
        state.cache.set(&dashboard_key(march), "{}", ttl).unwrap();
        state.cache.set(&dashboard_key(april), "{}", ttl).unwrap();

        let request = UpdateTransactionRequest {
            date: Some("2024-04-02".to_string()),
            ..Default::default()
        };
        let response = update_transaction_endpoint(State(state.clone()), Path(1), Json(request))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.cache.get(&dashboard_key(march)).unwrap(), None);
        assert_eq!(state.cache.get(&dashboard_key(april)).unwrap(), None);
    }

    #[tokio::test]
    async fn update_missing_transaction_returns_404() {
        let state = get_test_state();

        let response =
            update_transaction_endpoint(State(state), Path(999), Json(Default::default()))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_removes_transaction() {
        let state = get_test_state();
        seed_transaction(&state, 50.0, date!(2024 - 03 - 15), Category::Groceries);

        let response = delete_transaction_endpoint(State(state.clone()), Path(1))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let response = get_transaction_endpoint(State(state), Path(1))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_missing_transaction_returns_404() {
        let state = get_test_state();

        let response = delete_transaction_endpoint(State(state), Path(999))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    #[test]
    fn parse_date_accepts_iso_dates_only() {
        assert_eq!(super::parse_date("2024-03-15"), Ok(date!(2024 - 03 - 15)));
        assert_eq!(
            super::parse_date("2024-3-15"),
            Err(Error::InvalidDate("2024-3-15".to_string()))
        );
    }
}
