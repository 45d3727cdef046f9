//! Listing categories.

use axum::{
    Json,
    extract::{FromRef, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState, Error, TransactionKind, ValidationErrors,
    category::{Category, get_all_categories, get_categories_of_kind},
    db::Database,
};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    pub database: Database,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            database: state.database.clone(),
        }
    }
}

/// The query parameters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    /// Only list categories for this kind of transaction, "expense" or "income".
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// List the categories sorted by their order, optionally only those of one kind.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Vec<Category>>, Error> {
    let kind = match query.kind.as_deref() {
        Some(kind) => Some(kind.parse::<TransactionKind>().map_err(|_| {
            ValidationErrors::single("type", "must be one of expense or income")
        })?),
        None => None,
    };

    let connection = state.database.lock()?;

    let categories = match kind {
        Some(kind) => get_categories_of_kind(kind, &connection),
        None => get_all_categories(&connection),
    }
    .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    Ok(Json(categories))
}

#[cfg(test)]
mod list_categories_endpoint_tests {
    use axum::{
        Json,
        extract::{Query, State},
    };

    use crate::{
        Error, TransactionKind,
        category::{
            list::{CategoryListQuery, ListCategoriesState},
            list_categories_endpoint,
        },
        db::Database,
        test_utils::get_test_database,
    };

    fn get_state() -> ListCategoriesState {
        ListCategoriesState {
            database: get_test_database(),
        }
    }

    #[tokio::test]
    async fn lists_every_category() {
        let Json(categories) =
            list_categories_endpoint(State(get_state()), Query(CategoryListQuery::default()))
                .await
                .expect("Could not list categories");

        assert_eq!(categories.len(), 9);
    }

    #[tokio::test]
    async fn filters_by_kind() {
        let query = CategoryListQuery {
            kind: Some("income".to_owned()),
        };

        let Json(categories) = list_categories_endpoint(State(get_state()), Query(query))
            .await
            .expect("Could not list categories");

        assert_eq!(categories.len(), 4);
        assert!(
            categories
                .iter()
                .all(|category| category.kind == TransactionKind::Income)
        );
    }

    #[tokio::test]
    async fn rejects_unknown_kind() {
        let query = CategoryListQuery {
            kind: Some("transfer".to_owned()),
        };

        let result = list_categories_endpoint(State(get_state()), Query(query)).await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn fails_without_database() {
        let state = ListCategoriesState {
            database: Database::unavailable(),
        };

        let result =
            list_categories_endpoint(State(state), Query(CategoryListQuery::default())).await;

        assert!(matches!(result, Err(Error::DatabaseUnavailable)));
    }
}
