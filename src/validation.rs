//! Field level validation of JSON request bodies.
//!
//! Request bodies are read as raw JSON objects and checked field by field so
//! that every violated constraint can be reported back to the client at once.
//! Domain types provide the per-field rules (e.g. [crate::CategoryName::new]),
//! [Payload] collects the violations.

use std::fmt::Display;

use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use unicode_segmentation::UnicodeSegmentation;

use crate::Error;

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The name of the offending field as it appears in the request.
    pub field: String,
    /// What is wrong with the field.
    pub message: String,
}

/// Every constraint violated by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl ValidationErrors {
    /// Create a list holding a single violation.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    /// Record a violation for `field`.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(Violation {
            field: field.to_owned(),
            message: message.into(),
        });
    }

    /// Whether no violations have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The recorded violations in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    /// Consume the list, returning the recorded violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.0
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self
            .0
            .iter()
            .map(|violation| format!("{}: {}", violation.field, violation.message))
            .collect::<Vec<_>>()
            .join("; ");

        write!(f, "{text}")
    }
}

/// The outcome of checking a single field value.
pub(crate) type FieldResult<T> = Result<T, String>;

/// A JSON object request body that is being validated.
#[derive(Debug)]
pub(crate) struct Payload {
    fields: Map<String, Value>,
    errors: ValidationErrors,
}

impl Payload {
    /// Read the request body extracted by axum as a JSON object.
    ///
    /// # Errors
    /// Returns an [Error::Validation] with a violation on the field `body` if
    /// the body is not valid JSON or is not a JSON object.
    pub(crate) fn parse(body: Result<Json<Value>, JsonRejection>) -> Result<Self, Error> {
        match body {
            Ok(Json(value)) => Self::from_value(value),
            Err(rejection) => Err(Error::Validation(ValidationErrors::single(
                "body",
                rejection.body_text(),
            ))),
        }
    }

    /// Validate an already parsed JSON value.
    pub(crate) fn from_value(value: Value) -> Result<Self, Error> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: ValidationErrors::default(),
            }),
            _ => Err(Error::Validation(ValidationErrors::single(
                "body",
                "must be a JSON object",
            ))),
        }
    }

    /// Record a violation for every field that is not in `allowed`.
    pub(crate) fn reject_unknown_fields(&mut self, allowed: &[&str]) {
        let mut unknown: Vec<&String> = self
            .fields
            .keys()
            .filter(|key| !allowed.contains(&key.as_str()))
            .collect();
        unknown.sort();

        for key in unknown {
            self.errors.push(key, "is not a recognised field");
        }
    }

    /// Check an optional field.
    ///
    /// Returns `None` if the field is absent or if it fails `check`, in which
    /// case the violation is recorded.
    pub(crate) fn optional<T>(
        &mut self,
        field: &str,
        check: impl FnOnce(&Value) -> FieldResult<T>,
    ) -> Option<T> {
        let value = self.fields.get(field)?;

        match check(value) {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.push(field, message);
                None
            }
        }
    }

    /// Check a required field, recording a violation if it is absent.
    pub(crate) fn required<T>(
        &mut self,
        field: &str,
        check: impl FnOnce(&Value) -> FieldResult<T>,
    ) -> Option<T> {
        if !self.fields.contains_key(field) {
            self.errors.push(field, "is required");
            return None;
        }

        self.optional(field, check)
    }

    /// Finish validation, returning the violations found.
    pub(crate) fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

pub(crate) fn as_number(value: &Value) -> FieldResult<f64> {
    value
        .as_f64()
        .filter(|number| number.is_finite())
        .ok_or_else(|| "must be a number".to_owned())
}

pub(crate) fn as_integer(value: &Value) -> FieldResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| "must be an integer".to_owned())
}

pub(crate) fn as_str(value: &Value) -> FieldResult<&str> {
    value.as_str().ok_or_else(|| "must be a string".to_owned())
}

/// Parse a field that holds one of the variants of `T` as a string.
pub(crate) fn as_variant<T>(value: &Value, expected: &str) -> FieldResult<T>
where
    T: std::str::FromStr,
{
    as_str(value)?
        .parse()
        .map_err(|_| format!("must be one of {expected}"))
}

/// Parse an RFC 3339 date-time string, e.g. "2025-10-05T13:45:00Z".
pub(crate) fn as_date_time(value: &Value) -> FieldResult<OffsetDateTime> {
    parse_date_time(as_str(value)?)
}

/// Parse an RFC 3339 date-time string into a UTC instant.
pub(crate) fn parse_date_time(text: &str) -> FieldResult<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339)
        .map(|date_time| date_time.to_offset(time::UtcOffset::UTC))
        .map_err(|_| "must be an RFC 3339 date-time, e.g. 2025-10-05T13:45:00Z".to_owned())
}

/// The number of user-perceived characters in `text`.
pub(crate) fn text_length(text: &str) -> usize {
    text.graphemes(true).count()
}
