//! ExpensesHub is a web service for tracking personal expenses and incomes.
//!
//! Transactions are recorded against categories and summarised over daily,
//! weekly, monthly or yearly periods as category breakdowns. The library
//! provides a JSON API, a server rendered charts page and a client with
//! explicit state stores that mirror the server collections.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod category;
mod charts;
pub mod client;
mod database_id;
mod db;
mod endpoints;
mod html;
mod logging;
mod not_found;
mod period;
mod routing;
mod settings;
mod timezone;
mod transaction;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use category::{Category, CategoryName, Color, NewCategory};
pub use charts::{BreakdownResponse, ChartDataPoint, ChartSeries, breakdown, total};
pub use database_id::{CategoryId, DatabaseId, TransactionId};
pub use db::{Database, initialize as initialize_db};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use period::{DateRange, Period, period_range, period_range_for_date};
pub use routing::build_router;
pub use settings::{ChartType, Currency, DataView, Settings, SettingsPatch};
pub use transaction::{
    NewTransaction, Transaction, TransactionKind, TransactionListQuery, TransactionPatch,
    TransactionView, count_transactions, create_transaction, round_to_cents,
};
pub use validation::{ValidationErrors, Violation};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request payload violated one or more field constraints.
    ///
    /// Every violated constraint is listed, not just the first one found.
    #[error("invalid request data: {0}")]
    Validation(ValidationErrors),

    /// A period selector other than daily, weekly, monthly or yearly was used.
    #[error("\"{0}\" is not a valid period, expected daily, weekly, monthly or yearly")]
    InvalidPeriod(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A category with the same name already exists for the transaction kind.
    #[error("the category \"{name}\" already exists for {kind} transactions")]
    DuplicateCategory {
        /// The name of the rejected category.
        name: String,
        /// The kind of transactions the category is for.
        kind: TransactionKind,
    },

    /// The database could not be opened or initialized at startup.
    ///
    /// The server keeps running, but every operation that needs the database
    /// fails with this error.
    #[error("the database is unavailable")]
    DatabaseUnavailable,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// Transactions could not be written as CSV.
    #[error("could not write CSV: {0}")]
    Csv(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::Validation(value)
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// The HTTP status code of the response.
    pub status_code: u16,
    /// A human readable description of the failure.
    pub message: String,
    /// The field constraints that were violated, only set for validation errors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl Error {
    /// The HTTP status code that this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidPeriod(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateCategory { .. } => StatusCode::CONFLICT,
            Error::DatabaseUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::DatabaseLockError
            | Error::SqlError(_)
            | Error::InvalidTimezone(_)
            | Error::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to the client.
    ///
    /// Internal errors are replaced with a generic message, the details are
    /// only written to the server logs.
    fn client_message(&self) -> String {
        match self {
            Error::Validation(_) => "Invalid request data".to_owned(),
            Error::InvalidPeriod(_) | Error::NotFound | Error::DuplicateCategory { .. } => {
                self.to_string()
            }
            Error::DatabaseUnavailable => {
                "The database is unavailable, check the server logs for more details".to_owned()
            }
            _ => "An unexpected error occurred, check the server logs for more details".to_owned(),
        }
    }

    fn into_error_response(self) -> ErrorResponse {
        let status_code = self.status_code().as_u16();
        let message = self.client_message();
        let violations = match self {
            Error::Validation(errors) => errors.into_violations(),
            _ => Vec::new(),
        };

        ErrorResponse {
            status_code,
            message,
            violations,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (status, Json(self.into_error_response())).into_response()
    }
}
