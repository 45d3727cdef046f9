//! Updating the settings.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    Error, Settings, SettingsPatch,
    settings::{get::SettingsState, update_settings},
    validation::Payload,
};

/// Apply a partial update to the settings from a JSON body.
///
/// Unknown fields are rejected.
pub async fn update_settings_endpoint(
    State(state): State<SettingsState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Settings>, Error> {
    let patch = SettingsPatch::from_payload(Payload::parse(body)?)?;

    let connection = state.database.lock()?;

    update_settings(&patch, OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| tracing::error!("Could not update settings: {error}"))
        .map(Json)
}

#[cfg(test)]
mod update_settings_endpoint_tests {
    use axum::{Json, extract::State};
    use serde_json::json;

    use crate::{
        DataView, Error, Period,
        settings::{get::SettingsState, update_settings_endpoint},
        test_utils::get_test_database,
    };

    fn get_state() -> SettingsState {
        SettingsState {
            database: get_test_database(),
        }
    }

    #[tokio::test]
    async fn can_update_settings() {
        let body = json!({"defaultPeriod": "yearly", "defaultDataView": "incomes"});

        let Json(settings) = update_settings_endpoint(State(get_state()), Ok(Json(body)))
            .await
            .expect("Could not update settings");

        assert_eq!(settings.default_period, Period::Yearly);
        assert_eq!(settings.default_data_view, DataView::Incomes);
    }

    #[tokio::test]
    async fn rejects_unknown_fields() {
        let body = json!({"language": "en"});

        let result = update_settings_endpoint(State(get_state()), Ok(Json(body))).await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
