//! Database operations for transactions.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::{Date, OffsetDateTime};

use crate::{
    DatabaseId, Error,
    category::Category,
    month::Month,
    transaction::model::{NewTransaction, Transaction},
};

/// Optional filters applied to transaction list and count queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions in this category.
    pub category: Option<Category>,
    /// Only include transactions dated within this calendar month.
    pub month: Option<Month>,
}

/// The fields of a transaction that an update may change.
///
/// Fields left as `None` keep their stored values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    /// A new description.
    pub description: Option<String>,
    /// A new amount.
    pub amount: Option<f64>,
    /// A new date.
    pub date: Option<Date>,
    /// A new category.
    pub category: Option<Category>,
}

/// Initialize the transaction table and its indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category);",
    )?;

    Ok(())
}

/// Create a transaction and return it with its generated ID.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let created = connection
        .prepare(
            "INSERT INTO \"transaction\" (description, amount, date, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, description, amount, date, category, created_at",
        )?
        .query_row(
            (
                &transaction.description,
                transaction.amount,
                transaction.date,
                transaction.category.code(),
                OffsetDateTime::now_utc(),
            ),
            map_row,
        )?;

    Ok(created)
}

/// Retrieve a single transaction by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a stored
/// transaction.
pub fn get_transaction(id: DatabaseId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, description, amount, date, category, created_at
             FROM \"transaction\" WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Query transactions matching `filter`, ordered by date descending.
///
/// Rows on the same date keep insertion order (ID ascending) so pages stay
/// stable across updates.
pub fn query_transactions(
    filter: &TransactionFilter,
    limit: Option<u64>,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, parameters) = build_where_clause(filter);

    let mut query = format!(
        "SELECT id, description, amount, date, category, created_at FROM \"transaction\"\
         {where_clause} ORDER BY date DESC, id ASC"
    );

    if let Some(limit) = limit {
        query.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

/// Count the transactions matching `filter`.
pub fn count_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, parameters) = build_where_clause(filter);

    let query = format!("SELECT COUNT(id) FROM \"transaction\"{where_clause}");

    connection
        .query_row(&query, params_from_iter(parameters.iter()), |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as u64)
        .map_err(|error| error.into())
}

/// Apply `changes` to a stored transaction and return the updated row.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if `id` does not refer to a
/// stored transaction.
pub fn update_transaction(
    id: DatabaseId,
    changes: TransactionChanges,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let existing = get_transaction(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingTransaction,
        other => other,
    })?;

    let description = changes.description.unwrap_or(existing.description);
    let amount = changes.amount.unwrap_or(existing.amount);
    let date = changes.date.unwrap_or(existing.date);
    let category = changes.category.unwrap_or(existing.category);

    connection.execute(
        "UPDATE \"transaction\" SET description = ?1, amount = ?2, date = ?3, category = ?4
         WHERE id = ?5",
        (&description, amount, date, category.code(), id),
    )?;

    Ok(Transaction {
        id,
        description,
        amount,
        date,
        category,
        created_at: existing.created_at,
    })
}

/// Delete a transaction by ID and return the deleted row.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if `id` does not refer to a
/// stored transaction.
pub fn delete_transaction(id: DatabaseId, connection: &Connection) -> Result<Transaction, Error> {
    let existing = get_transaction(id, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingTransaction,
        other => other,
    })?;

    connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    Ok(existing)
}

fn build_where_clause(filter: &TransactionFilter) -> (String, Vec<Value>) {
    let mut clause_parts = vec![];
    let mut parameters = vec![];

    if let Some(category) = filter.category {
        clause_parts.push(format!("category = ?{}", parameters.len() + 1));
        parameters.push(Value::Text(category.code().to_owned()));
    }

    if let Some(month) = filter.month {
        clause_parts.push(format!(
            "date BETWEEN ?{} AND ?{}",
            parameters.len() + 1,
            parameters.len() + 2,
        ));
        parameters.push(Value::Text(month.first_day().to_string()));
        parameters.push(Value::Text(month.last_day().to_string()));
    }

    if clause_parts.is_empty() {
        (String::new(), parameters)
    } else {
        (format!(" WHERE {}", clause_parts.join(" AND ")), parameters)
    }
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_category: String = row.get(4)?;

    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row.get(3)?,
        category: Category::from_code(&raw_category),
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod transaction_db_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{
        TransactionChanges, TransactionFilter, count_transactions, create_transaction,
        delete_transaction, get_transaction, query_transactions, update_transaction,
    };
    use crate::{
        Error, category::Category, db::initialize, month::Month, transaction::NewTransaction,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn groceries(amount: f64, date: time::Date) -> NewTransaction {
        NewTransaction::new("groceries", amount, date, Category::Groceries).unwrap()
    }

    #[test]
    fn create_assigns_id_and_round_trips() {
        let connection = get_test_connection();
        let new_transaction = groceries(85.5, date!(2024 - 03 - 15));

        let created = create_transaction(new_transaction, &connection).unwrap();

        assert!(created.id > 0);
        assert_eq!(created.amount, 85.5);
        assert_eq!(created.category, Category::Groceries);
        assert_eq!(Ok(created), get_transaction(1, &connection));
    }

    #[test]
    fn get_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();
        create_transaction(groceries(85.5, date!(2024 - 03 - 15)), &connection).unwrap();

        let result = get_transaction(999, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn query_filters_by_month_inclusive() {
        let connection = get_test_connection();
        let want = [
            create_transaction(groceries(1.0, date!(2024 - 03 - 01)), &connection).unwrap(),
            create_transaction(groceries(2.0, date!(2024 - 03 - 31)), &connection).unwrap(),
        ];

        // Outside the month, should not be returned.
        for date in [date!(2024 - 02 - 29), date!(2024 - 04 - 01)] {
            create_transaction(groceries(999.0, date), &connection).unwrap();
        }

        let filter = TransactionFilter {
            month: Some(Month::new(2024, 3).unwrap()),
            ..Default::default()
        };
        let mut got = query_transactions(&filter, None, 0, &connection).unwrap();
        got.sort_by_key(|transaction| transaction.id);

        assert_eq!(got, want);
    }

    #[test]
    fn query_filters_by_category() {
        let connection = get_test_connection();
        create_transaction(groceries(1.0, date!(2024 - 03 - 01)), &connection).unwrap();
        let rent = create_transaction(
            NewTransaction::new("rent", 1200.0, date!(2024 - 03 - 01), Category::Rent).unwrap(),
            &connection,
        )
        .unwrap();

        let filter = TransactionFilter {
            category: Some(Category::Rent),
            ..Default::default()
        };
        let got = query_transactions(&filter, None, 0, &connection).unwrap();

        assert_eq!(got, vec![rent]);
    }

    #[test]
    fn query_orders_by_date_descending_then_id() {
        let connection = get_test_connection();
        let oldest = create_transaction(groceries(1.0, date!(2024 - 03 - 01)), &connection).unwrap();
        let newest = create_transaction(groceries(2.0, date!(2024 - 03 - 20)), &connection).unwrap();
        let same_day_first = newest.clone();
        let same_day_second =
            create_transaction(groceries(3.0, date!(2024 - 03 - 20)), &connection).unwrap();

        let got = query_transactions(&TransactionFilter::default(), None, 0, &connection).unwrap();

        assert_eq!(got, vec![same_day_first, same_day_second, oldest]);
    }

    #[test]
    fn query_applies_limit_and_offset() {
        let connection = get_test_connection();
        for day in 1..=10 {
            create_transaction(
                groceries(day as f64, date!(2024 - 03 - 01).replace_day(day).unwrap()),
                &connection,
            )
            .unwrap();
        }

        let got = query_transactions(&TransactionFilter::default(), Some(4), 8, &connection).unwrap();

        // Date descending: offset 8 skips days 10..=3.
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].date, date!(2024 - 03 - 02));
        assert_eq!(got[1].date, date!(2024 - 03 - 01));
    }

    #[test]
    fn count_matches_filter() {
        let connection = get_test_connection();
        create_transaction(groceries(1.0, date!(2024 - 03 - 01)), &connection).unwrap();
        create_transaction(groceries(2.0, date!(2024 - 04 - 01)), &connection).unwrap();

        let all = count_transactions(&TransactionFilter::default(), &connection).unwrap();
        let march = count_transactions(
            &TransactionFilter {
                month: Some(Month::new(2024, 3).unwrap()),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(all, 2);
        assert_eq!(march, 1);
    }

    #[test]
    fn update_merges_changes_and_keeps_unset_fields() {
        let connection = get_test_connection();
        let created =
            create_transaction(groceries(85.5, date!(2024 - 03 - 15)), &connection).unwrap();

        let updated = update_transaction(
            created.id,
            TransactionChanges {
                amount: Some(90.0),
                date: Some(date!(2024 - 04 - 02)),
                ..Default::default()
            },
            &connection,
        )
        .unwrap();

        assert_eq!(updated.description, created.description);
        assert_eq!(updated.category, created.category);
        assert_eq!(updated.amount, 90.0);
        assert_eq!(updated.date, date!(2024 - 04 - 02));
        assert_eq!(Ok(updated), get_transaction(created.id, &connection));
    }

    #[test]
    fn update_with_invalid_id_fails() {
        let connection = get_test_connection();

        let result = update_transaction(999, TransactionChanges::default(), &connection);

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_removes_row_and_returns_it() {
        let connection = get_test_connection();
        let created =
            create_transaction(groceries(85.5, date!(2024 - 03 - 15)), &connection).unwrap();

        let deleted = delete_transaction(created.id, &connection).unwrap();

        assert_eq!(deleted, created);
        assert_eq!(
            get_transaction(created.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_with_invalid_id_fails() {
        let connection = get_test_connection();

        let result = delete_transaction(999, &connection);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
    }

    #[test]
    fn unknown_stored_category_folds_into_other() {
        let connection = get_test_connection();
        let created =
            create_transaction(groceries(5.0, date!(2024 - 03 - 15)), &connection).unwrap();
        connection
            .execute(
                "UPDATE \"transaction\" SET category = 'DISCONTINUED' WHERE id = ?1",
                [created.id],
            )
            .unwrap();

        let transaction = get_transaction(created.id, &connection).unwrap();

        assert_eq!(transaction.category, Category::Other);
    }
}
