//! Reading the settings.

use axum::{
    Json,
    extract::{FromRef, State},
};
use time::OffsetDateTime;

use crate::{AppState, Error, Settings, db::Database, settings::get_or_create_settings};

/// The state needed for reading and updating the settings.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub database: Database,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
        }
    }
}

/// Get the settings, creating them with the defaults on first access.
pub async fn get_settings_endpoint(
    State(state): State<SettingsState>,
) -> Result<Json<Settings>, Error> {
    let connection = state.database.lock()?;

    get_or_create_settings(OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| tracing::error!("Could not get settings: {error}"))
        .map(Json)
}
