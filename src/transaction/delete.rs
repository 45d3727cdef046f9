//! Deleting transactions.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
};

use crate::{
    AppState, Error, TransactionId, db::Database, transaction::delete_transaction,
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub database: Database,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
        }
    }
}

/// Permanently delete a transaction, responding with 204 No Content.
///
/// Responds with 404 if the transaction does not exist.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state.database.lock()?;

    delete_transaction(transaction_id, &connection).inspect_err(|error| {
        tracing::warn!("Could not delete transaction {transaction_id}: {error}")
    })?;

    Ok(StatusCode::NO_CONTENT)
}
