//! Application router configuration.
//!
//! Authentication is handled per-handler: protected handlers take a
//! [crate::Claims] argument whose extractor verifies the bearer token, so
//! the router itself has no auth middleware layer.

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState, Error,
    auth::{sign_in, sign_up},
    category::{create_category_endpoint, list_categories_endpoint},
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, expense_analytics_endpoint,
        get_expense_endpoint, list_expenses_endpoint, update_expense_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::SIGN_UP, post(sign_up))
        .route(endpoints::SIGN_IN, post(sign_in))
        .route(
            endpoints::CATEGORIES,
            post(create_category_endpoint).get(list_categories_endpoint),
        )
        .route(
            endpoints::EXPENSES,
            post(create_expense_endpoint).get(list_expenses_endpoint),
        )
        .route(endpoints::EXPENSE_ANALYTICS, get(expense_analytics_endpoint))
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .patch(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The JSON response for requests that match no route.
async fn get_404_not_found() -> Error {
    Error::NotFound
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::test_utils::get_test_server;

    #[tokio::test]
    async fn unknown_route_returns_json_404() {
        let server = get_test_server();

        let response = server.get("/definitely/not/a/route").await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body = response.json::<Value>();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let server = get_test_server();

        for path in ["/expenses", "/expenses/1", "/expenses/analytics", "/categories"] {
            let response = server.get(path).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
        }
    }
}
