//! An [Api](crate::client::Api) implementation that talks to the server over HTTP.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::{
    Category, ErrorResponse, NewCategory, NewTransaction, Settings, SettingsPatch, Transaction,
    TransactionId, TransactionListQuery, TransactionPatch, TransactionView,
    client::{Api, ClientError},
    endpoints::{self, format_endpoint},
};

/// An [Api] that sends requests to a running server.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    /// Create a client for the server at `base_url`, e.g. "http://localhost:3000".
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client for the server at `base_url` that sends requests with `client`.
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Turn an error status into [ClientError::Api], using the server's message
/// when the body has one.
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(error) => error.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("the request failed")
            .to_owned(),
    };
    tracing::debug!("Request failed with {status}: {message}");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    check_status(response)
        .await?
        .json::<T>()
        .await
        .map_err(|error| ClientError::Decode(error.to_string()))
}

impl Api for HttpApi {
    async fn list_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> Result<Vec<TransactionView>, ClientError> {
        let response = self
            .client
            .get(self.url(endpoints::TRANSACTIONS_API))
            .query(query)
            .send()
            .await?;

        decode(response).await
    }

    async fn create_transaction(
        &self,
        transaction: &NewTransaction,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .client
            .post(self.url(endpoints::TRANSACTIONS_API))
            .json(transaction)
            .send()
            .await?;

        decode(response).await
    }

    async fn update_transaction(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Transaction, ClientError> {
        let response = self
            .client
            .patch(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
            .json(patch)
            .send()
            .await?;

        decode(response).await
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format_endpoint(endpoints::TRANSACTION, id)))
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let response = self
            .client
            .get(self.url(endpoints::CATEGORIES_API))
            .send()
            .await?;

        decode(response).await
    }

    async fn create_category(&self, category: &NewCategory) -> Result<Category, ClientError> {
        let response = self
            .client
            .post(self.url(endpoints::CATEGORIES_API))
            .json(category)
            .send()
            .await?;

        decode(response).await
    }

    async fn get_settings(&self) -> Result<Settings, ClientError> {
        let response = self
            .client
            .get(self.url(endpoints::SETTINGS_API))
            .send()
            .await?;

        decode(response).await
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, ClientError> {
        let response = self
            .client
            .patch(self.url(endpoints::SETTINGS_API))
            .json(patch)
            .send()
            .await?;

        decode(response).await
    }
}
