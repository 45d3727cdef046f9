//! Implements a struct that holds the state of the REST server.

use rusqlite::Connection;

use crate::{Error, db::Database, db::initialize};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection
    pub database: Database,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models
    /// and seeding the default categories and settings.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, local_timezone: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            database: Database::new(db_connection),
        })
    }

    /// Create an [AppState] for a server whose database could not be opened.
    ///
    /// Every endpoint that needs the database responds with 503 Service Unavailable.
    pub fn degraded(local_timezone: &str) -> Self {
        Self {
            local_timezone: local_timezone.to_owned(),
            database: Database::unavailable(),
        }
    }
}
