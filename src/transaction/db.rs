//! Database operations for transactions.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error, TransactionId,
    category::map_category_row,
    db::{get_parsed, get_timestamp, to_timestamp},
    transaction::{NewTransaction, Transaction, TransactionKind, TransactionPatch, TransactionView},
};

const SELECT_COLUMNS: &str =
    "id, kind, amount, category_id, description, date, created_at, updated_at";

/// Which transactions to select, unset fields match every transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only select transactions on or after this instant.
    pub start: Option<OffsetDateTime>,
    /// Only select transactions strictly before this instant.
    pub end: Option<OffsetDateTime>,
    /// Only select transactions of this kind.
    pub kind: Option<TransactionKind>,
}

/// Create a transaction and return it with its generated ID and timestamps.
///
/// If `new_transaction` has no date, the transaction is dated `now`.
pub fn create_transaction(
    new_transaction: NewTransaction,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let timestamp = to_timestamp(now);
    let date = new_transaction.date.map(to_timestamp).unwrap_or(timestamp);

    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (kind, amount, category_id, description, date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                new_transaction.kind.as_str(),
                new_transaction.amount,
                new_transaction.category_id,
                new_transaction.description,
                date,
                timestamp,
            ],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve a single transaction by ID.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve the transactions matching `filter` with their categories, most recent first.
///
/// Transactions with the same date are ordered by descending ID so the most
/// recently created comes first.
pub fn query_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<TransactionView>, Error> {
    connection
        .prepare(
            "SELECT t.id, t.kind, t.amount, t.category_id, t.description, t.date, t.created_at, t.updated_at,
                c.id, c.name, c.icon, c.color, c.kind, c.is_default, c.\"order\", c.created_at, c.updated_at
            FROM \"transaction\" t
            LEFT JOIN category c ON c.id = t.category_id
            WHERE (?1 IS NULL OR t.date >= ?1)
                AND (?2 IS NULL OR t.date < ?2)
                AND (?3 IS NULL OR t.kind = ?3)
            ORDER BY t.date DESC, t.id DESC",
        )?
        .query_map(
            params![
                filter.start.map(to_timestamp),
                filter.end.map(to_timestamp),
                filter.kind.map(TransactionKind::as_str),
            ],
            map_view_row,
        )?
        .map(|maybe_view| maybe_view.map_err(|error| error.into()))
        .collect()
}

/// Apply `patch` to the transaction with `id` and return the updated transaction.
///
/// The update time is only changed if the patch sets at least one field.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn update_transaction(
    id: TransactionId,
    patch: &TransactionPatch,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if patch.is_empty() {
        return get_transaction(id, connection);
    }

    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET
                kind = COALESCE(?1, kind),
                amount = COALESCE(?2, amount),
                category_id = COALESCE(?3, category_id),
                description = COALESCE(?4, description),
                date = COALESCE(?5, date),
                updated_at = ?6
            WHERE id = ?7
            RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                patch.kind.map(TransactionKind::as_str),
                patch.amount,
                patch.category_id,
                patch.description,
                patch.date.map(to_timestamp),
                to_timestamp(now),
                id,
            ],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Delete a transaction by ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no transaction with `id`.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the total number of transactions.
pub fn count_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|count| count as usize)
        .map_err(|error| error.into())
}

/// Initialize the transaction table and indexes.
///
/// The category ID is a plain column, not a foreign key, so removing a
/// category leaves its transactions in place.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
            amount REAL NOT NULL CHECK (amount >= 0.01 AND amount <= 1000000),
            category_id INTEGER NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            date INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date DESC);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_date ON \"transaction\"(category_id, date DESC);
        CREATE INDEX IF NOT EXISTS idx_transaction_kind_date ON \"transaction\"(kind, date DESC);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        kind: get_parsed(row, 1)?,
        amount: row.get(2)?,
        category_id: row.get(3)?,
        description: row.get(4)?,
        date: get_timestamp(row, 5)?,
        created_at: get_timestamp(row, 6)?,
        updated_at: get_timestamp(row, 7)?,
    })
}

fn map_view_row(row: &Row) -> Result<TransactionView, rusqlite::Error> {
    let transaction = map_row(row)?;
    let category_id: Option<i64> = row.get(8)?;

    let category = match category_id {
        Some(_) => Some(map_category_row(row, 8)?),
        None => None,
    };

    Ok(TransactionView {
        transaction,
        category,
    })
}

#[cfg(test)]
mod transaction_query_tests {
    use rusqlite::Connection;
    use time::{Duration, macros::datetime};

    use crate::{
        Error, NewTransaction, TransactionKind, TransactionPatch,
        db::initialize,
        transaction::{
            TransactionFilter, count_transactions, create_transaction, db::get_transaction,
            delete_transaction, query_transactions, update_transaction,
        },
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn new_transaction(kind: TransactionKind, amount: f64, category_id: i64) -> NewTransaction {
        NewTransaction {
            kind,
            amount,
            category_id,
            description: String::new(),
            date: None,
        }
    }

    #[test]
    fn create_transaction_succeeds() {
        let connection = get_test_db_connection();
        let now = datetime!(2025-10-05 12:00 UTC);

        let transaction = create_transaction(
            NewTransaction {
                description: "Coffee".to_owned(),
                ..new_transaction(TransactionKind::Expense, 4.5, 1)
            },
            now,
            &connection,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, 4.5);
        assert_eq!(transaction.description, "Coffee");
        assert_eq!(transaction.date, now);
        assert_eq!(transaction.created_at, now);
        assert_eq!(transaction.updated_at, now);
        assert_eq!(get_transaction(transaction.id, &connection), Ok(transaction));
    }

    #[test]
    fn create_transaction_keeps_given_date() {
        let connection = get_test_db_connection();
        let date = datetime!(2025-09-01 08:00 UTC);

        let transaction = create_transaction(
            NewTransaction {
                date: Some(date),
                ..new_transaction(TransactionKind::Income, 100.0, 6)
            },
            datetime!(2025-10-05 12:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(transaction.date, date);
    }

    #[test]
    fn get_transaction_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();

        assert_eq!(get_transaction(42, &connection), Err(Error::NotFound));
    }

    #[test]
    fn query_sorts_by_date_descending_and_joins_category() {
        let connection = get_test_db_connection();
        let now = datetime!(2025-10-05 12:00 UTC);
        for days in [3, 1, 2] {
            create_transaction(
                NewTransaction {
                    date: Some(now - Duration::days(days)),
                    ..new_transaction(TransactionKind::Expense, days as f64, 1)
                },
                now,
                &connection,
            )
            .unwrap();
        }

        let got = query_transactions(&TransactionFilter::default(), &connection).unwrap();

        let amounts: Vec<_> = got.iter().map(|view| view.transaction.amount).collect();
        assert_eq!(amounts, [1.0, 2.0, 3.0]);
        let category = got[0].category.as_ref().expect("category should be joined");
        assert_eq!(category.name.as_ref(), "Food");
    }

    #[test]
    fn query_returns_null_category_for_missing_category() {
        let connection = get_test_db_connection();
        create_transaction(
            new_transaction(TransactionKind::Expense, 1.0, 999),
            datetime!(2025-10-05 12:00 UTC),
            &connection,
        )
        .unwrap();

        let got = query_transactions(&TransactionFilter::default(), &connection).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].category, None);
    }

    #[test]
    fn query_range_is_half_open() {
        let connection = get_test_db_connection();
        let start = datetime!(2025-10-01 00:00 UTC);
        let end = datetime!(2025-11-01 00:00 UTC);
        for date in [start - Duration::SECOND, start, end - Duration::SECOND, end] {
            create_transaction(
                NewTransaction {
                    date: Some(date),
                    ..new_transaction(TransactionKind::Expense, 1.0, 1)
                },
                date,
                &connection,
            )
            .unwrap();
        }
        let filter = TransactionFilter {
            start: Some(start),
            end: Some(end),
            kind: None,
        };

        let got = query_transactions(&filter, &connection).unwrap();

        let dates: Vec<_> = got.iter().map(|view| view.transaction.date).collect();
        assert_eq!(dates, [end - Duration::SECOND, start]);
    }

    #[test]
    fn query_filters_by_kind() {
        let connection = get_test_db_connection();
        let now = datetime!(2025-10-05 12:00 UTC);
        create_transaction(new_transaction(TransactionKind::Expense, 1.0, 1), now, &connection)
            .unwrap();
        create_transaction(new_transaction(TransactionKind::Income, 2.0, 6), now, &connection)
            .unwrap();
        let filter = TransactionFilter {
            kind: Some(TransactionKind::Income),
            ..Default::default()
        };

        let got = query_transactions(&filter, &connection).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].transaction.kind, TransactionKind::Income);
    }

    #[test]
    fn update_changes_only_given_fields() {
        let connection = get_test_db_connection();
        let created = datetime!(2025-10-05 12:00 UTC);
        let updated = datetime!(2025-10-06 12:00 UTC);
        let transaction = create_transaction(
            new_transaction(TransactionKind::Expense, 10.0, 1),
            created,
            &connection,
        )
        .unwrap();
        let patch = TransactionPatch {
            amount: Some(12.5),
            description: Some("Lunch".to_owned()),
            ..Default::default()
        };

        let got = update_transaction(transaction.id, &patch, updated, &connection).unwrap();

        assert_eq!(got.amount, 12.5);
        assert_eq!(got.description, "Lunch");
        assert_eq!(got.kind, TransactionKind::Expense);
        assert_eq!(got.category_id, 1);
        assert_eq!(got.created_at, created);
        assert_eq!(got.updated_at, updated);
    }

    #[test]
    fn update_with_invalid_id_returns_not_found() {
        let connection = get_test_db_connection();
        let patch = TransactionPatch {
            amount: Some(1.0),
            ..Default::default()
        };

        let got = update_transaction(42, &patch, datetime!(2025-10-05 12:00 UTC), &connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_transaction_succeeds() {
        let connection = get_test_db_connection();
        let transaction = create_transaction(
            new_transaction(TransactionKind::Expense, 10.0, 1),
            datetime!(2025-10-05 12:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_transaction(transaction.id, &connection), Ok(()));
        assert_eq!(get_transaction(transaction.id, &connection), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_transaction_returns_not_found_and_keeps_others() {
        let connection = get_test_db_connection();
        create_transaction(
            new_transaction(TransactionKind::Expense, 10.0, 1),
            datetime!(2025-10-05 12:00 UTC),
            &connection,
        )
        .unwrap();

        assert_eq!(delete_transaction(999, &connection), Err(Error::NotFound));
        assert_eq!(count_transactions(&connection), Ok(1));
    }
}
