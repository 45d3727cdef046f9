//! Core transaction domain types and the normalization of their fields.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    Category, CategoryId, Error, TransactionId, ValidationErrors,
    validation::{
        FieldResult, Payload, as_date_time, as_integer, as_number, as_str, as_variant, text_length,
    },
};

/// The largest amount a single transaction may have.
pub const MAX_AMOUNT: f64 = 1_000_000.0;

/// The maximum number of characters in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

/// Whether money was spent or received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money that was spent.
    Expense,
    /// Money that was received.
    Income,
}

impl TransactionKind {
    /// The value used for this kind in the database, query strings and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::Validation(ValidationErrors::single(
                "type",
                format!("\"{other}\" is not one of expense or income"),
            ))),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Round `amount` to the nearest cent.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Check a transaction amount and round it to cents.
///
/// The amount must be greater than zero, no more than [MAX_AMOUNT] and at
/// least 0.01 once rounded.
pub fn normalize_amount(amount: f64) -> FieldResult<f64> {
    if !amount.is_finite() {
        return Err("must be a number".to_owned());
    }

    if amount <= 0.0 {
        return Err("must be greater than 0".to_owned());
    }

    if amount > MAX_AMOUNT {
        return Err(format!("must be at most {MAX_AMOUNT}"));
    }

    let rounded = round_to_cents(amount);

    if rounded < 0.01 {
        return Err("must be at least 0.01 when rounded to cents".to_owned());
    }

    Ok(rounded)
}

/// Trim a transaction description and check its length.
pub fn normalize_description(description: &str) -> FieldResult<String> {
    let description = description.trim();

    if text_length(description) > MAX_DESCRIPTION_LENGTH {
        return Err(format!(
            "must be at most {MAX_DESCRIPTION_LENGTH} characters long"
        ));
    }

    Ok(description.to_owned())
}

fn parse_amount(value: &Value) -> FieldResult<f64> {
    normalize_amount(as_number(value)?)
}

fn parse_kind(value: &Value) -> FieldResult<TransactionKind> {
    as_variant(value, "expense or income")
}

fn parse_description(value: &Value) -> FieldResult<String> {
    normalize_description(as_str(value)?)
}

/// An expense or income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether money was spent or received.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money, always positive and rounded to cents.
    pub amount: f64,
    /// The category the transaction belongs to.
    ///
    /// The category may have been removed since the transaction was created.
    pub category_id: CategoryId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A transaction together with its category, if the category still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: Transaction,
    /// The category the transaction refers to.
    pub category: Option<Category>,
}

/// The data for creating a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// Whether money was spent or received.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The amount of money, rounded to cents.
    pub amount: f64,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// A text description, empty if not given.
    pub description: String,
    /// When the transaction happened, the time of creation if not set.
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
}

impl NewTransaction {
    /// Validate a transaction creation request body.
    ///
    /// The amount is rounded to cents and the description is trimmed.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every invalid field.
    pub(crate) fn from_payload(mut payload: Payload) -> Result<Self, Error> {
        let kind = payload.required("type", parse_kind);
        let amount = payload.required("amount", parse_amount);
        let category_id = payload.required("categoryId", as_integer);
        let description = payload.optional("description", parse_description);
        let date = payload.optional("date", as_date_time);
        let errors = payload.into_errors();

        match (kind, amount, category_id) {
            (Some(kind), Some(amount), Some(category_id)) if errors.is_empty() => Ok(Self {
                kind,
                amount,
                category_id,
                description: description.unwrap_or_default(),
                date,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// A partial update to a transaction, fields left as `None` are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    /// The new kind.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    /// The new amount, rounded to cents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// The new category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// The new description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The new date.
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
}

impl TransactionPatch {
    const FIELDS: [&str; 5] = ["type", "amount", "categoryId", "description", "date"];

    /// Validate a transaction update request body.
    ///
    /// Fields other than the five mutable fields are rejected.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every invalid or unknown field.
    pub(crate) fn from_payload(mut payload: Payload) -> Result<Self, Error> {
        payload.reject_unknown_fields(&Self::FIELDS);

        let kind = payload.optional("type", parse_kind);
        let amount = payload.optional("amount", parse_amount);
        let category_id = payload.optional("categoryId", as_integer);
        let description = payload.optional("description", parse_description);
        let date = payload.optional("date", as_date_time);
        let errors = payload.into_errors();

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(Self {
            kind,
            amount,
            category_id,
            description,
            date,
        })
    }

    /// Whether the patch leaves every field unchanged.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the changed fields to `transaction`.
    pub fn apply_to(&self, transaction: &mut Transaction) {
        if let Some(kind) = self.kind {
            transaction.kind = kind;
        }

        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }

        if let Some(category_id) = self.category_id {
            transaction.category_id = category_id;
        }

        if let Some(description) = &self.description {
            transaction.description = description.clone();
        }

        if let Some(date) = self.date {
            transaction.date = date;
        }
    }
}


#[cfg(test)]
mod payload_tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::{Error, NewTransaction, TransactionKind, TransactionPatch, validation::Payload};

    fn parse_new(value: serde_json::Value) -> Result<NewTransaction, Error> {
        NewTransaction::from_payload(Payload::from_value(value).unwrap())
    }

    fn parse_patch(value: serde_json::Value) -> Result<TransactionPatch, Error> {
        TransactionPatch::from_payload(Payload::from_value(value).unwrap())
    }

    fn violated_fields(error: Error) -> Vec<String> {
        match error {
            Error::Validation(errors) => errors
                .into_violations()
                .into_iter()
                .map(|violation| violation.field)
                .collect(),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn parses_new_transaction() {
        let got = parse_new(json!({
            "type": "expense",
            "amount": 19.999,
            "categoryId": 3,
            "description": " coffee ",
            "date": "2025-10-05T08:30:00Z"
        }));

        assert_eq!(
            got,
            Ok(NewTransaction {
                kind: TransactionKind::Expense,
                amount: 20.0,
                category_id: 3,
                description: "coffee".to_owned(),
                date: Some(datetime!(2025-10-05 08:30 UTC)),
            })
        );
    }

    #[test]
    fn new_transaction_defaults() {
        let got = parse_new(json!({"type": "income", "amount": 10, "categoryId": 1})).unwrap();

        assert_eq!(got.description, "");
        assert_eq!(got.date, None);
    }

    #[test]
    fn new_transaction_reports_every_violation() {
        let got = parse_new(json!({"type": "transfer", "amount": -1, "date": "yesterday"}));

        assert_eq!(
            violated_fields(got.unwrap_err()),
            ["type", "amount", "categoryId", "date"]
        );
    }

    #[test]
    fn new_transaction_allows_unknown_fields() {
        let got = parse_new(json!({
            "type": "income",
            "amount": 10,
            "categoryId": 1,
            "note": "ignored"
        }));

        assert!(got.is_ok());
    }

    #[test]
    fn patch_is_strict() {
        let got = parse_patch(json!({"amount": 5, "userId": 1}));

        assert_eq!(violated_fields(got.unwrap_err()), ["userId"]);
    }

    #[test]
    fn patch_parses_subset() {
        let got = parse_patch(json!({"amount": 5.556, "description": "x"})).unwrap();

        assert_eq!(
            got,
            TransactionPatch {
                amount: Some(5.56),
                description: Some("x".to_owned()),
                ..Default::default()
            }
        );
        assert!(!got.is_empty());
        assert!(parse_patch(json!({})).unwrap().is_empty());
    }
}
