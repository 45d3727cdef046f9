//! Database setup and the shared connection handle.

use std::{
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

use rusqlite::{Connection, Row, types::Type};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{create_category_table, seed_default_categories},
    settings::{create_settings_table, insert_default_settings},
    transaction::create_transaction_table,
};

/// Create the application tables and seed the default records.
///
/// Safe to call on an existing database: tables are only created if they do
/// not exist, default categories are only seeded into an empty category table
/// and the settings record is only inserted if it is missing.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_settings_table(&transaction)?;

    let now = OffsetDateTime::now_utc();
    seed_default_categories(now, &transaction)?;
    insert_default_settings(now, &transaction)?;

    transaction.commit()?;

    Ok(())
}

/// The shared database connection.
///
/// The connection is absent when the database could not be opened or
/// initialized at startup, in which case every operation fails with
/// [Error::DatabaseUnavailable].
#[derive(Debug, Clone)]
pub struct Database {
    connection: Option<Arc<Mutex<Connection>>>,
}

impl Database {
    /// Wrap an initialized connection.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection: Some(Arc::new(Mutex::new(connection))),
        }
    }

    /// A database handle that fails every operation.
    pub fn unavailable() -> Self {
        Self { connection: None }
    }

    /// Whether the database was opened successfully.
    pub fn is_available(&self) -> bool {
        self.connection.is_some()
    }

    /// Acquire exclusive access to the connection.
    ///
    /// # Errors
    /// Returns [Error::DatabaseUnavailable] if there is no connection, or
    /// [Error::DatabaseLockError] if the lock is poisoned.
    pub fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        let connection = self
            .connection
            .as_ref()
            .ok_or(Error::DatabaseUnavailable)?;

        connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

/// Convert an instant to the unix milliseconds stored in the database.
pub(crate) fn to_timestamp(instant: OffsetDateTime) -> i64 {
    (instant.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Convert unix milliseconds read from the database to a UTC instant.
pub(crate) fn from_timestamp(
    milliseconds: i64,
) -> Result<OffsetDateTime, time::error::ComponentRange> {
    OffsetDateTime::from_unix_timestamp_nanos(milliseconds as i128 * 1_000_000)
}

/// Read a timestamp column as a UTC instant.
pub(crate) fn get_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let milliseconds: i64 = row.get(index)?;

    from_timestamp(milliseconds).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

/// Read a text column holding the string form of `T`, e.g. an enum variant.
pub(crate) fn get_parsed<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(index)?;

    text.parse().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
