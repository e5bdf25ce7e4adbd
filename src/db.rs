//! Database initialization.

use rusqlite::Connection;

use crate::{budget::create_budget_table, transaction::create_transaction_table};

/// Create the application's tables and indexes if they do not exist.
///
/// Safe to call on every start-up.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    create_transaction_table(connection)?;
    create_budget_table(connection)?;

    Ok(())
}
