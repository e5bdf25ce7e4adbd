//! The HTTP handler for the dashboard, and the read-through snapshot
//! computation behind it.

use axum::{
    extract::{Query, State},
    http::{HeaderValue, header},
    response::Response,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    AppState, Cache, Error, api,
    budget::{BudgetFilter, query_budgets},
    cache::{
        BUDGET_ALERTS_TTL, CATEGORY_BREAKDOWN_TTL, DASHBOARD_CURRENT_MONTH_TTL, DASHBOARD_TTL,
        MONTHLY_EXPENSES_TTL, budget_alerts_key, category_breakdown_key, dashboard_key,
        monthly_expenses_key,
    },
    dashboard::{
        aggregation::{budget_alerts, category_breakdown, top_spending_category, total_expenses},
        model::{DashboardSnapshot, MonthlyExpenses, TrendPoint},
    },
    month::Month,
    transaction::{TransactionFilter, query_transactions},
};

/// The number of months covered by the spending trend series, including the
/// snapshot's own month.
const TREND_MONTHS: usize = 6;

/// The number of transactions shown in the recent transactions list.
const RECENT_TRANSACTIONS: usize = 5;

/// The query parameters for `GET /dashboard`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The `YYYY-MM` month to aggregate. Defaults to the current month.
    pub month: Option<String>,
    /// A cache-busting timestamp. Its presence forces recomputation.
    #[serde(rename = "_t")]
    pub cachebust: Option<String>,
}

/// A route handler for the dashboard snapshot.
///
/// The response carries `Cache-Control: no-cache` headers so that clients
/// always come back to the server, where the snapshot cache decides whether
/// to recompute.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub async fn get_dashboard_endpoint(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let month = match query.month.as_deref() {
        Some(text) => text.parse()?,
        None => Month::current(),
    };

    let snapshot = compute_dashboard(month, query.cachebust.is_some(), &state)?;

    let mut response = api::ok(snapshot);
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));

    Ok(response)
}

/// Compute the dashboard snapshot for `month`, going through the cache.
///
/// A cached snapshot is served as-is unless `force_refresh` is set. Cache
/// read and write failures are logged and treated as misses, so a broken
/// cache degrades to recomputing every request instead of failing it.
///
/// # Panics
/// Panics if the lock for the database connection is already held by the
/// same thread.
pub fn compute_dashboard(
    month: Month,
    force_refresh: bool,
    state: &AppState,
) -> Result<DashboardSnapshot, Error> {
    let key = dashboard_key(month);

    if !force_refresh {
        match state.cache.get(&key) {
            Ok(Some(cached)) => match serde_json::from_str(&cached) {
                Ok(snapshot) => return Ok(snapshot),
                Err(error) => {
                    tracing::warn!("discarding unreadable cached snapshot for {key}: {error}");
                }
            },
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("cache read failed for {key}, recomputing: {error}");
            }
        }
    }

    let connection = state.db_connection.lock().unwrap();

    let transactions = query_transactions(
        &TransactionFilter {
            month: Some(month),
            ..Default::default()
        },
        None,
        0,
        &connection,
    )?;

    let breakdown = category_breakdown(&transactions);

    let mut spending_trends = Vec::with_capacity(TREND_MONTHS);
    for trend_month in month.trailing(TREND_MONTHS) {
        let amount = if trend_month == month {
            total_expenses(&transactions)
        } else {
            let trend_transactions = query_transactions(
                &TransactionFilter {
                    month: Some(trend_month),
                    ..Default::default()
                },
                None,
                0,
                &connection,
            )?;
            total_expenses(&trend_transactions)
        };

        spending_trends.push(TrendPoint {
            month: trend_month.label(),
            amount,
        });
    }

    let budgets = query_budgets(
        &BudgetFilter {
            month: Some(month),
            ..Default::default()
        },
        &connection,
    )?;
    drop(connection);

    let snapshot = DashboardSnapshot {
        monthly_expenses: MonthlyExpenses {
            total: total_expenses(&transactions),
            month: month.full_label(),
        },
        top_spending_category: top_spending_category(&breakdown),
        budget_alerts: budget_alerts(&budgets, &breakdown),
        category_breakdown: breakdown,
        spending_trends,
        transaction_count: transactions.len() as u64,
        recent_transactions: transactions
            .into_iter()
            .take(RECENT_TRANSACTIONS)
            .collect(),
        last_updated: OffsetDateTime::now_utc(),
    };

    let ttl = if month == Month::current() {
        DASHBOARD_CURRENT_MONTH_TTL
    } else {
        DASHBOARD_TTL
    };

    cache_aggregate(&state.cache, &key, &snapshot, ttl);
    cache_aggregate(
        &state.cache,
        &monthly_expenses_key(month),
        &snapshot.monthly_expenses,
        MONTHLY_EXPENSES_TTL,
    );
    cache_aggregate(
        &state.cache,
        &category_breakdown_key(month),
        &snapshot.category_breakdown,
        CATEGORY_BREAKDOWN_TTL,
    );
    cache_aggregate(
        &state.cache,
        &budget_alerts_key(month),
        &snapshot.budget_alerts,
        BUDGET_ALERTS_TTL,
    );

    Ok(snapshot)
}

/// Serialize `value` and store it under `key`.
///
/// Failures are logged and swallowed so that a broken cache never fails a
/// request.
fn cache_aggregate<T: serde::Serialize>(
    cache: &Cache,
    key: &str,
    value: &T,
    ttl: std::time::Duration,
) {
    match serde_json::to_string(value) {
        Ok(json) => {
            if let Err(error) = cache.set(key, &json, ttl) {
                tracing::warn!("cache write failed for {key}: {error}");
            }
        }
        Err(error) => {
            tracing::warn!("could not serialize cache entry for {key}: {error}");
        }
    }
}
