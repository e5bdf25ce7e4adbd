//! Transactions: the domain model, database operations, and HTTP handlers.

mod db;
mod endpoints;
mod model;

pub use db::{
    TransactionChanges, TransactionFilter, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, query_transactions,
    update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use model::{MAX_AMOUNT, MAX_DESCRIPTION_LENGTH, NewTransaction, Transaction};
pub(crate) use model::validate_amount;
