//! The dashboard snapshot and its parts.
//!
//! The snapshot both serializes to the wire format and round-trips through
//! the cache as JSON, so every type here derives both [Serialize] and
//! [Deserialize].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::transaction::Transaction;

/// All of the aggregate statistics for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// The total spent in the month.
    pub monthly_expenses: MonthlyExpenses,
    /// The five most recent transactions in the month.
    pub recent_transactions: Vec<Transaction>,
    /// The category with the highest spending, or `None` for a month with no
    /// transactions.
    pub top_spending_category: Option<TopSpendingCategory>,
    /// Spending per category display label. Only categories with at least one
    /// transaction appear.
    pub category_breakdown: BTreeMap<String, f64>,
    /// Total spending for the six months ending at the snapshot's month,
    /// oldest first.
    pub spending_trends: Vec<TrendPoint>,
    /// Warnings for budgets whose spending is at or past the alert
    /// thresholds.
    pub budget_alerts: Vec<BudgetAlert>,
    /// The number of transactions in the month.
    pub transaction_count: u64,
    /// When the snapshot was computed.
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

/// The total spent in a month, with the month's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyExpenses {
    /// The sum of absolute transaction amounts.
    pub total: f64,
    /// The month as e.g. "March 2024".
    pub month: String,
}

/// The category with the highest spending in a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSpendingCategory {
    /// The category display label.
    pub category: String,
    /// The amount spent in the category.
    pub amount: f64,
}

/// One point in the six-month spending trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// The month as e.g. "Mar 2024".
    pub month: String,
    /// The total spent in the month.
    pub amount: f64,
}

/// How far past its budget a category is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    /// Spending has reached or passed the budget.
    Exceeded,
    /// Spending has reached 80% of the budget.
    Warning,
}

/// A warning that spending in a category is at or past its budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    /// The category display label.
    pub category: String,
    /// Whether the budget is exceeded or merely close.
    #[serde(rename = "type")]
    pub kind: AlertKind,
    /// A human-readable description of the alert.
    pub message: String,
    /// The amount spent in the category.
    pub spent: f64,
    /// The budgeted amount.
    pub budget: f64,
    /// Spending as a percentage of the budget.
    pub percentage: f64,
}
