//! Creating transactions.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    db::Database,
    transaction::{NewTransaction, Transaction, create_transaction},
    validation::Payload,
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub database: Database,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
        }
    }
}

/// Create a transaction from a JSON body, responding with 201 Created and the new transaction.
///
/// The category ID is not checked against the existing categories.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let new_transaction = NewTransaction::from_payload(Payload::parse(body)?)?;

    let connection = state.database.lock()?;

    let transaction = create_transaction(new_transaction, OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| tracing::error!("Could not create transaction: {error}"))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}
