//! Fintrack is a small HTTP service for tracking personal finances.
//!
//! Users record income and expense transactions, assign them to a fixed set
//! of categories, set monthly budgets, and read an aggregated dashboard
//! (monthly totals, category breakdowns, spending trends, and budget
//! alerts). Derived dashboard data is served through a read-through cache
//! that is eagerly invalidated on every write.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

use crate::api::{ApiErrorBody, FieldError};

mod api;
pub mod budget;
mod cache;
pub mod category;
pub mod dashboard;
mod db;
mod endpoints;
mod invalidation;
pub mod month;
mod pagination;
mod app_state;
mod routing;
pub mod transaction;

pub use app_state::AppState;
pub use cache::Cache;
pub use db::initialize as initialize_db;
pub use routing::build_router;

/// Alias for the integer type used for database row IDs.
pub type DatabaseId = i64;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used for a transaction description.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// A transaction description longer than the allowed maximum.
    #[error("description must be at most {0} characters")]
    DescriptionTooLong(usize),

    /// An amount outside the allowed range was used for a transaction or
    /// budget.
    #[error("amount must be greater than zero and at most {0}")]
    AmountOutOfRange(f64),

    /// A category label that does not match any known category.
    ///
    /// Unknown labels are rejected at the API boundary so that only the
    /// fixed set of category codes is ever written to the store.
    #[error("\"{0}\" is not a known category")]
    UnknownCategory(String),

    /// A month string that is not in `YYYY-MM` format or is out of range.
    #[error("\"{0}\" is not a valid month, expected YYYY-MM")]
    InvalidMonth(String),

    /// A date string that could not be parsed as a calendar date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A page or limit query parameter outside the allowed range.
    #[error("{0} must be a positive integer")]
    InvalidPageParameter(&'static str),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created. Internally, this error may occur when a query returns no
    /// rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist.
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist.
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// An update would leave two budgets for the same category and month.
    ///
    /// Only `PUT /budgets/{id}` can hit this: `POST /budgets` upserts on
    /// the (category, month) pair instead of erroring.
    #[error("a budget for this category and month already exists")]
    DuplicateBudget,

    /// Could not acquire the cache lock.
    ///
    /// Cache failures are never fatal: readers treat this as a miss and
    /// writers log and continue.
    #[error("could not acquire the cache lock")]
    CacheLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("budget") =>
            {
                Error::DuplicateBudget
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The request field that a validation error refers to, if any.
    fn field(&self) -> Option<&'static str> {
        match self {
            Error::EmptyDescription | Error::DescriptionTooLong(_) => Some("description"),
            Error::AmountOutOfRange(_) => Some("amount"),
            Error::UnknownCategory(_) => Some("category"),
            Error::InvalidMonth(_) => Some("month"),
            Error::InvalidDate(_) => Some("date"),
            Error::InvalidPageParameter(field) => Some(field),
            _ => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Some(field) = self.field() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiErrorBody::with_details(
                    "Validation failed",
                    vec![FieldError {
                        field,
                        message: self.to_string(),
                    }],
                )),
            )
                .into_response();
        }

        match self {
            Error::NotFound => {
                (StatusCode::NOT_FOUND, Json(ApiErrorBody::new("Not found"))).into_response()
            }
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Json(ApiErrorBody::new("Transaction not found")),
            )
                .into_response(),
            Error::UpdateMissingBudget | Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                Json(ApiErrorBody::new("Budget not found")),
            )
                .into_response(),
            Error::DuplicateBudget => (
                StatusCode::CONFLICT,
                Json(ApiErrorBody::new(
                    "A budget for this category and month already exists",
                )),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiErrorBody::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}
