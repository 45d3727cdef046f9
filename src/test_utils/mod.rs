#![allow(missing_docs)]

pub(crate) mod html;
pub(crate) mod http;

use rusqlite::Connection;

use crate::db::{Database, initialize};

pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_status_ok, get_header};

/// An initialized in-memory database with the default categories and settings.
pub(crate) fn get_test_database() -> Database {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    Database::new(connection)
}
