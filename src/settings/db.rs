//! Database operations for the settings record.

use rusqlite::{Connection, OptionalExtension, Row, params};
use time::OffsetDateTime;

use crate::{
    ChartType, DataView, Error, Period, Settings, SettingsPatch,
    db::{get_parsed, get_timestamp, to_timestamp},
    settings::Currency,
};

const SELECT_COLUMNS: &str =
    "default_period, default_chart_type, default_data_view, currency, created_at, updated_at";

/// Insert the settings record with default values if it does not exist yet.
pub fn insert_default_settings(now: OffsetDateTime, connection: &Connection) -> Result<(), Error> {
    let timestamp = to_timestamp(now);

    connection.execute(
        "INSERT OR IGNORE INTO settings
            (id, default_period, default_chart_type, default_data_view, currency, created_at, updated_at)
        VALUES (1, ?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            Period::default().as_str(),
            ChartType::default().as_str(),
            DataView::default().as_str(),
            Currency::default().as_ref(),
            timestamp,
        ],
    )?;

    Ok(())
}

/// Retrieve the settings, creating them with default values if they do not exist.
pub fn get_or_create_settings(
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Settings, Error> {
    if let Some(settings) = select_settings(connection)? {
        return Ok(settings);
    }

    tracing::info!("No settings found, creating default settings");
    insert_default_settings(now, connection)?;

    select_settings(connection)?.ok_or(Error::NotFound)
}

/// Apply `patch` to the settings, creating them first if they do not exist.
///
/// The update time is only changed if the patch sets at least one field.
pub fn update_settings(
    patch: &SettingsPatch,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Settings, Error> {
    insert_default_settings(now, connection)?;

    if *patch == SettingsPatch::default() {
        return get_or_create_settings(now, connection);
    }

    connection
        .prepare(&format!(
            "UPDATE settings SET
                default_period = COALESCE(?1, default_period),
                default_chart_type = COALESCE(?2, default_chart_type),
                default_data_view = COALESCE(?3, default_data_view),
                currency = COALESCE(?4, currency),
                updated_at = ?5
            WHERE id = 1
            RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                patch.default_period.map(Period::as_str),
                patch.default_chart_type.map(ChartType::as_str),
                patch.default_data_view.map(DataView::as_str),
                patch.currency.as_ref().map(|currency| currency.as_ref()),
                to_timestamp(now),
            ],
            map_row,
        )
        .map_err(|error| error.into())
}

fn select_settings(connection: &Connection) -> Result<Option<Settings>, Error> {
    connection
        .prepare(&format!("SELECT {SELECT_COLUMNS} FROM settings WHERE id = 1"))?
        .query_row([], map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Initialize the settings table.
///
/// The table can only ever hold the row with the ID 1.
pub fn create_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            default_period TEXT NOT NULL,
            default_chart_type TEXT NOT NULL,
            default_data_view TEXT NOT NULL,
            currency TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Settings, rusqlite::Error> {
    let raw_currency: String = row.get(3)?;

    Ok(Settings {
        default_period: get_parsed(row, 0)?,
        default_chart_type: get_parsed(row, 1)?,
        default_data_view: get_parsed(row, 2)?,
        currency: Currency::new_unchecked(&raw_currency),
        created_at: get_timestamp(row, 4)?,
        updated_at: get_timestamp(row, 5)?,
    })
}
