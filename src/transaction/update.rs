//! Updating transactions.

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    AppState, Error, TransactionId,
    db::Database,
    transaction::{Transaction, TransactionPatch, update_transaction},
    validation::Payload,
};

/// The state needed for updating a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    pub database: Database,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
        }
    }
}

/// Apply a partial update from a JSON body to a transaction.
///
/// Unknown fields are rejected. Responds with 404 if the transaction does not exist.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let patch = TransactionPatch::from_payload(Payload::parse(body)?)?;

    let connection = state.database.lock()?;

    update_transaction(transaction_id, &patch, OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| {
            tracing::warn!("Could not update transaction {transaction_id}: {error}")
        })
        .map(Json)
}
