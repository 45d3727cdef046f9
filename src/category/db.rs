//! Database operations for categories.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error, TransactionKind,
    ValidationErrors,
    category::{Category, CategoryName, Color, DEFAULT_CATEGORIES, MAX_ORDER, NewCategory},
    db::{get_parsed, get_timestamp, to_timestamp},
};

const SELECT_COLUMNS: &str =
    "id, name, icon, color, kind, is_default, \"order\", created_at, updated_at";

/// Create a category and return it with its generated ID and timestamps.
///
/// If `new_category` has no order, the category is placed after the last
/// category of the same kind.
///
/// # Errors
/// Returns [Error::DuplicateCategory] if a category with the same name and
/// kind already exists, or an [Error::Validation] on the field `order` if the
/// order would be greater than [MAX_ORDER].
pub fn create_category(
    new_category: NewCategory,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Category, Error> {
    insert_category(&new_category, false, now, connection).map_err(|error| match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 2067 => {
            Error::DuplicateCategory {
                name: new_category.name.to_string(),
                kind: new_category.kind,
            }
        }
        // Code 275 occurs when a CHECK constraint failed, only the order can
        // fail one once the category has been validated.
        rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 275 => {
            let message = match new_category.order {
                Some(_) => format!("must be an integer between 0 and {MAX_ORDER}"),
                None => format!(
                    "must be given, the {} categories already use the largest order {MAX_ORDER}",
                    new_category.kind
                ),
            };
            Error::Validation(ValidationErrors::single("order", message))
        }
        error => error.into(),
    })
}

fn insert_category(
    new_category: &NewCategory,
    is_default: bool,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Category, rusqlite::Error> {
    let timestamp = to_timestamp(now);

    connection
        .prepare(&format!(
            "INSERT INTO category (name, icon, color, kind, is_default, \"order\", created_at, updated_at)
            VALUES (
                ?1, ?2, ?3, ?4, ?5,
                COALESCE(?6, (SELECT COALESCE(MAX(\"order\"), 0) + 1 FROM category WHERE kind = ?4)),
                ?7, ?7
            )
            RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                new_category.name.as_ref(),
                new_category.icon,
                new_category.color.as_ref(),
                new_category.kind.as_str(),
                is_default,
                new_category.order,
                timestamp,
            ],
            map_row,
        )
}

/// Retrieve all categories ordered by their position.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM category ORDER BY \"order\" ASC, id ASC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories for one kind of transaction ordered by their position.
pub fn get_categories_of_kind(
    kind: TransactionKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM category WHERE kind = ?1 ORDER BY \"order\" ASC, id ASC"
        ))?
        .query_map([kind.as_str()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Insert the default categories if the category table is empty.
///
/// Returns the number of categories inserted.
pub fn seed_default_categories(
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(0);
    }

    let mut orders = [0u32; 2];

    for (kind, name, icon, color) in DEFAULT_CATEGORIES {
        let order = match kind {
            TransactionKind::Expense => &mut orders[0],
            TransactionKind::Income => &mut orders[1],
        };
        *order += 1;

        let new_category = NewCategory {
            name: CategoryName::new_unchecked(name),
            icon: icon.to_owned(),
            color: Color::new_unchecked(color),
            kind,
            order: Some(*order),
        };

        insert_category(&new_category, true, now, connection)?;
    }

    tracing::info!("Seeded {} default categories", DEFAULT_CATEGORIES.len());

    Ok(DEFAULT_CATEGORIES.len())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('expense', 'income')),
            is_default INTEGER NOT NULL DEFAULT 0,
            \"order\" INTEGER NOT NULL CHECK (\"order\" BETWEEN 0 AND {MAX_ORDER}),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_kind_order ON category(kind, \"order\");"
    ))?;

    Ok(())
}

/// Map a row holding the category columns starting at `offset`.
pub(crate) fn map_row_with_offset(row: &Row, offset: usize) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(offset + 1)?;
    let raw_color: String = row.get(offset + 3)?;

    Ok(Category {
        id: row.get(offset)?,
        name: CategoryName::new_unchecked(&raw_name),
        icon: row.get(offset + 2)?,
        color: Color::new_unchecked(&raw_color),
        kind: get_parsed(row, offset + 4)?,
        is_default: row.get(offset + 5)?,
        order: row.get(offset + 6)?,
        created_at: get_timestamp(row, offset + 7)?,
        updated_at: get_timestamp(row, offset + 8)?,
    })
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_row_with_offset(row, 0)
}
