//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    CategoryId, Error, TransactionKind,
    validation::{FieldResult, Payload, as_integer, as_str, as_variant, text_length},
};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 30;

/// The icon used when a category is created without one.
pub const DEFAULT_ICON: &str = "🔷";

/// The color used when a category is created without one.
pub const DEFAULT_COLOR: &str = "#8B5CF6";

/// The largest position a category may have.
///
/// Kept well below [u32::MAX] so the position after it is still a valid
/// SQLite integer that maps back to [u32].
pub const MAX_ORDER: u32 = i32::MAX as u32;

/// The categories seeded into an empty database, as (kind, name, icon, color).
///
/// The order of each category is its position within its kind, starting at 1.
pub const DEFAULT_CATEGORIES: [(TransactionKind, &str, &str, &str); 9] = [
    (TransactionKind::Expense, "Food", "🍔", "#10B981"),
    (TransactionKind::Expense, "Transport", "🚗", "#3B82F6"),
    (TransactionKind::Expense, "Bills", "📄", "#F59E0B"),
    (TransactionKind::Expense, "Shopping", "🛍️", "#EF4444"),
    (TransactionKind::Expense, "Other", "🔷", "#8B5CF6"),
    (TransactionKind::Income, "Salary", "💰", "#10B981"),
    (TransactionKind::Income, "Freelance", "💻", "#3B82F6"),
    (TransactionKind::Income, "Gifts", "🎁", "#EC4899"),
    (TransactionKind::Income, "Other", "🔷", "#8B5CF6"),
];

/// A validated category name between 1 and 30 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, removing surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns a message describing the problem if `name` is empty or longer
    /// than [MAX_CATEGORY_NAME_LENGTH] characters after trimming.
    pub fn new(name: &str) -> FieldResult<Self> {
        let name = name.trim();

        if name.is_empty() {
            Err("must not be empty".to_owned())
        } else if text_length(name) > MAX_CATEGORY_NAME_LENGTH {
            Err(format!(
                "must be at most {MAX_CATEGORY_NAME_LENGTH} characters long"
            ))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is a valid name.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hex color in the form `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Color(String);

impl Color {
    /// Create a color from a hex string such as "#10B981".
    ///
    /// # Errors
    ///
    /// Returns a message describing the problem if `color` is not a `#`
    /// followed by exactly six hexadecimal digits.
    pub fn new(color: &str) -> FieldResult<Self> {
        let is_valid = color.strip_prefix('#').is_some_and(|digits| {
            digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
        });

        if is_valid {
            Ok(Self(color.to_owned()))
        } else {
            Err("must be a hex color in the form #RRGGBB".to_owned())
        }
    }

    /// Create a color without validation.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label that transactions of one kind are grouped by (e.g., 'Food', 'Salary').
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category, unique among categories of the same kind.
    pub name: CategoryName,
    /// A glyph shown next to the name.
    pub icon: String,
    /// The color used for the category in charts.
    pub color: Color,
    /// The kind of transactions the category is for.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Whether the category was seeded rather than created by the user.
    pub is_default: bool,
    /// The position of the category when listed.
    pub order: u32,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the category was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The data for creating a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// The name of the new category.
    pub name: CategoryName,
    /// A glyph shown next to the name.
    pub icon: String,
    /// The color used for the category in charts.
    pub color: Color,
    /// The kind of transactions the category is for.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// The position of the category, placed after the last category of the
    /// same kind if not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl NewCategory {
    /// Create a category with the default icon and color.
    pub fn new(name: CategoryName, kind: TransactionKind) -> Self {
        Self {
            name,
            icon: DEFAULT_ICON.to_owned(),
            color: Color::new_unchecked(DEFAULT_COLOR),
            kind,
            order: None,
        }
    }

    /// Validate a category creation request body.
    ///
    /// # Errors
    /// Returns an [Error::Validation] listing every invalid field.
    pub(crate) fn from_payload(mut payload: Payload) -> Result<Self, Error> {
        let name = payload.required("name", |value| CategoryName::new(as_str(value)?));
        let icon = payload.optional("icon", |value| parse_icon(as_str(value)?));
        let color = payload.optional("color", |value| Color::new(as_str(value)?));
        let kind = payload.required("type", |value| {
            as_variant::<TransactionKind>(value, "expense or income")
        });
        let order = payload.optional("order", parse_order);
        let errors = payload.into_errors();

        match (name, kind) {
            (Some(name), Some(kind)) if errors.is_empty() => Ok(Self {
                name,
                icon: icon.unwrap_or_else(|| DEFAULT_ICON.to_owned()),
                color: color.unwrap_or_else(|| Color::new_unchecked(DEFAULT_COLOR)),
                kind,
                order,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

fn parse_icon(icon: &str) -> FieldResult<String> {
    let icon = icon.trim();

    if icon.is_empty() {
        Err("must not be empty".to_owned())
    } else {
        Ok(icon.to_owned())
    }
}

fn parse_order(value: &serde_json::Value) -> FieldResult<u32> {
    let order = as_integer(value)?;

    u32::try_from(order)
        .ok()
        .filter(|order| *order <= MAX_ORDER)
        .ok_or_else(|| format!("must be an integer between 0 and {MAX_ORDER}"))
}
