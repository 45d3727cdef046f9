//! Creating categories.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    category::{Category, NewCategory, create_category},
    db::Database,
    validation::Payload,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub database: Database,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
        }
    }
}

/// Create a category from a JSON body, responding with 201 Created and the new category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let new_category = NewCategory::from_payload(Payload::parse(body)?)?;

    let connection = state.database.lock()?;

    let category = create_category(new_category, OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| tracing::warn!("Could not create category: {error}"))?;

    Ok((StatusCode::CREATED, Json(category)))
}
