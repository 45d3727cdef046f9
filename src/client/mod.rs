//! A client for the ExpensesHub API with local state stores.
//!
//! The stores mirror the server collections and apply changes optimistically,
//! undoing them when the server rejects the change. [Stores] groups one store
//! per collection around a single shared [Api] implementation.

mod api;
mod http;
mod store;

pub use api::{Api, ClientError};
pub use http::HttpApi;
pub use store::{CategoryStore, SettingsStore, Stores, TransactionStore};
