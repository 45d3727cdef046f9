//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, patch},
};

use crate::{
    AppState,
    category::{create_category_endpoint, list_categories_endpoint},
    charts::{get_breakdown_endpoint, get_charts_page},
    endpoints,
    not_found::get_404_not_found,
    settings::{get_settings_endpoint, update_settings_endpoint},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, export_transactions_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            endpoints::CATEGORIES_API,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::SETTINGS_API,
            get(get_settings_endpoint).patch(update_settings_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_EXPORT,
            get(export_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            patch(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::BREAKDOWN_API, get(get_breakdown_endpoint));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::CHARTS_VIEW, get(get_charts_page))
        .merge(api_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the charts page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::CHARTS_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_charts() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::CHARTS_VIEW);
    }
}
