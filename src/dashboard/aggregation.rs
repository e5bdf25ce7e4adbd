//! Pure aggregation functions over a month's transactions and budgets.

use std::collections::BTreeMap;

use crate::{
    budget::Budget,
    dashboard::model::{AlertKind, BudgetAlert, TopSpendingCategory},
    transaction::Transaction,
};

/// Spending at or past this percentage of a budget raises an exceeded alert.
pub(crate) const EXCEEDED_THRESHOLD: f64 = 100.0;

/// Spending at or past this percentage of a budget raises a warning alert.
pub(crate) const WARNING_THRESHOLD: f64 = 80.0;

/// Sum the absolute amounts of `transactions`.
///
/// Amounts are treated as magnitudes, so refunds recorded as negative
/// amounts still count towards spending totals.
pub fn total_expenses(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .map(|transaction| transaction.amount.abs())
        .sum()
}

/// Sum the absolute amounts of `transactions` per category display label.
pub fn category_breakdown(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut breakdown: BTreeMap<String, f64> = BTreeMap::new();

    for transaction in transactions {
        *breakdown
            .entry(transaction.category.label().to_owned())
            .or_default() += transaction.amount.abs();
    }

    breakdown
}

/// Find the category with the highest spending.
///
/// Ties break towards the lexicographically smallest label, which keeps the
/// result stable across recomputations.
pub fn top_spending_category(breakdown: &BTreeMap<String, f64>) -> Option<TopSpendingCategory> {
    let mut top: Option<(&String, f64)> = None;

    // BTreeMap iterates in label order, so a strictly-greater comparison
    // keeps the first label among equals.
    for (label, &amount) in breakdown {
        if top.is_none_or(|(_, top_amount)| amount > top_amount) {
            top = Some((label, amount));
        }
    }

    top.map(|(label, amount)| TopSpendingCategory {
        category: label.clone(),
        amount,
    })
}

/// Build alerts for budgets whose spending has reached the warning or
/// exceeded thresholds.
///
/// Alerts come out in the order the budgets were given. Budgets below the
/// warning threshold produce no alert.
pub fn budget_alerts(budgets: &[Budget], breakdown: &BTreeMap<String, f64>) -> Vec<BudgetAlert> {
    let mut alerts = vec![];

    for budget in budgets {
        let label = budget.category.label();
        let spent = breakdown.get(label).copied().unwrap_or(0.0);
        let percentage = spent / budget.amount * 100.0;

        let (kind, message) = if percentage >= EXCEEDED_THRESHOLD {
            (AlertKind::Exceeded, format!("Budget exceeded for {label}"))
        } else if percentage >= WARNING_THRESHOLD {
            (
                AlertKind::Warning,
                format!("Approaching budget limit for {label}"),
            )
        } else {
            continue;
        };

        alerts.push(BudgetAlert {
            category: label.to_owned(),
            kind,
            message,
            spent,
            budget: budget.amount,
            percentage,
        });
    }

    alerts
}
