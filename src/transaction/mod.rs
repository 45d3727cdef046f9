//! Expense and income transactions.

mod create;
mod db;
mod delete;
mod domain;
mod export;
mod list;
mod update;

pub use create::create_transaction_endpoint;
pub use db::{
    TransactionFilter, count_transactions, create_transaction, create_transaction_table,
    delete_transaction, query_transactions, update_transaction,
};
pub use delete::delete_transaction_endpoint;
pub use domain::{
    NewTransaction, Transaction, TransactionKind, TransactionPatch, TransactionView, round_to_cents,
};
pub use export::export_transactions_endpoint;
pub use list::{TransactionListQuery, list_transactions_endpoint};
pub use update::update_transaction_endpoint;
