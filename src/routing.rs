//! Router configuration for the data service.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints,
    seed::initialize_endpoint,
    transaction::{
        get_bar_chart_endpoint, get_pie_chart_endpoint, get_statistics_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the data service's routes.
///
/// Any origin may call the API, since the dashboard may be served from a
/// different host or port.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::INITIALIZE_API, get(initialize_endpoint))
        .route(endpoints::TRANSACTIONS_API, get(list_transactions_endpoint))
        .route(endpoints::STATISTICS_API, get(get_statistics_endpoint))
        .route(endpoints::BAR_CHART_API, get(get_bar_chart_endpoint))
        .route(endpoints::PIE_CHART_API, get(get_pie_chart_endpoint))
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_404_not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "details": format!("no route for {}", uri.path()),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, StatusCode, header};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, endpoints,
        seed::tests::StaticSeedSource,
        transaction::{NewTransaction, Transaction},
    };

    use super::build_router;

    fn seed_data() -> Vec<NewTransaction> {
        vec![
            Transaction::build(50.0, "2024-03-01")
                .title("Backpack")
                .sold(true)
                .category("A"),
            Transaction::build(150.0, "2024-03-15")
                .title("Jacket")
                .category("B"),
            Transaction::build(950.0, "2024-06-15")
                .title("Laptop")
                .category("electronics"),
        ]
    }

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            StaticSeedSource(seed_data()),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/nope").expect_failure().await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn initialize_then_query_every_endpoint() {
        let server = get_test_server();

        server.get(endpoints::INITIALIZE_API).await.assert_status_ok();

        let page: Value = server
            .get(endpoints::TRANSACTIONS_API)
            .add_query_param("month", "03")
            .await
            .json();
        assert_eq!(page["total"], 2);

        server
            .get(endpoints::STATISTICS_API)
            .add_query_param("month", "03")
            .await
            .assert_json(&json!({
                "totalSaleAmount": 200.0,
                "totalSoldItems": 1,
                "totalNotSoldItems": 1,
            }));

        let bar_chart: Vec<Value> = server
            .get(endpoints::BAR_CHART_API)
            .add_query_param("month", "06")
            .await
            .json();
        assert_eq!(bar_chart.len(), 10);
        assert_eq!(bar_chart[9], json!({ "range": "901-above", "count": 1 }));

        server
            .get(endpoints::PIE_CHART_API)
            .add_query_param("month", "03")
            .await
            .assert_json(&json!([
                { "category": "A", "count": 1 },
                { "category": "B", "count": 1 },
            ]));
    }

    #[tokio::test]
    async fn cross_origin_requests_are_allowed() {
        let server = get_test_server();

        let response = server
            .get(endpoints::STATISTICS_API)
            .add_header(header::ORIGIN, HeaderValue::from_static("http://localhost:3000"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }
}
