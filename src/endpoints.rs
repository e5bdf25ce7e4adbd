//! The API endpoint URIs.

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to fetch, update, or delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}";
/// The route to list and upsert budgets.
pub const BUDGETS: &str = "/budgets";
/// The route to fetch, update, or delete a single budget.
pub const BUDGET: &str = "/budgets/{budget_id}";
/// The route for the dashboard snapshot.
pub const DASHBOARD: &str = "/dashboard";
