//! The operations the client needs from the server, independent of transport.

use std::future::Future;

use crate::{
    Category, NewCategory, NewTransaction, Settings, SettingsPatch, Transaction,
    TransactionId, TransactionListQuery, TransactionPatch, TransactionView,
};

/// The errors that can occur when talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response could not be received.
    #[error("could not reach the server: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request.
    #[error("the server responded with {status}: {message}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The message from the server's error response.
        message: String,
    },

    /// The response body was not what was expected.
    #[error("could not decode the response: {0}")]
    Decode(String),
}

/// The operations the server offers.
///
/// Implemented over HTTP by [HttpApi](crate::client::HttpApi).
pub trait Api: Send + Sync {
    /// List the transactions matching `query`, most recent first.
    fn list_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> impl Future<Output = Result<Vec<TransactionView>, ClientError>> + Send;

    /// Create a transaction.
    fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> impl Future<Output = Result<Transaction, ClientError>> + Send;

    /// Change some fields of the transaction with `id`.
    fn update_transaction(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> impl Future<Output = Result<Transaction, ClientError>> + Send;

    /// Delete the transaction with `id`.
    fn delete_transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// List every category in display order.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ClientError>> + Send;

    /// Create a category.
    fn create_category(
        &self,
        category: &NewCategory,
    ) -> impl Future<Output = Result<Category, ClientError>> + Send;

    /// Get the settings.
    fn get_settings(&self) -> impl Future<Output = Result<Settings, ClientError>> + Send;

    /// Change some of the settings.
    fn update_settings(
        &self,
        patch: &SettingsPatch,
    ) -> impl Future<Output = Result<Settings, ClientError>> + Send;
}
