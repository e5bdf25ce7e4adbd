//! Budgets: the domain model, database operations, and HTTP handlers.

mod db;
mod endpoints;
mod model;

pub use db::{
    BudgetChanges, BudgetFilter, create_budget_table, delete_budget, get_budget, query_budgets,
    update_budget, upsert_budget,
};
pub use endpoints::{
    delete_budget_endpoint, get_budget_endpoint, list_budgets_endpoint, update_budget_endpoint,
    upsert_budget_endpoint,
};
pub use model::{Budget, NewBudget};
