//! The dashboard: aggregate spending statistics served through a
//! read-through cache.

mod aggregation;
mod endpoints;
mod model;

pub use aggregation::{
    budget_alerts, category_breakdown, top_spending_category, total_expenses,
};
pub use endpoints::{compute_dashboard, get_dashboard_endpoint};
pub use model::{
    AlertKind, BudgetAlert, DashboardSnapshot, MonthlyExpenses, TopSpendingCategory, TrendPoint,
};
