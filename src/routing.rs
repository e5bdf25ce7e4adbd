//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    AppState,
    api::ApiErrorBody,
    budget::{
        delete_budget_endpoint, get_budget_endpoint, list_budgets_endpoint, update_budget_endpoint,
        upsert_budget_endpoint,
    },
    dashboard::get_dashboard_endpoint,
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(upsert_budget_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .fallback(get_unknown_route)
        .with_state(state)
}

/// The handler for requests that match no route.
async fn get_unknown_route() -> Response {
    (StatusCode::NOT_FOUND, Json(ApiErrorBody::new("Not found"))).into_response()
}
