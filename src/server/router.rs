//! Router construction for the REST API

use super::handlers::{AppState, create_order, delete_order, get_order, list_orders};
use crate::core::service::OrderService;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Collection path of the order resource
pub const ORDERS_PATH: &str = "/api/v1/orders";

/// Build the order routes:
/// - POST /api/v1/orders - Create an order
/// - GET /api/v1/orders - List orders, filtered by `priority`, `status`, `department`
/// - GET /api/v1/orders/{id} - Get one order
/// - DELETE /api/v1/orders/{id} - Delete one order
pub fn build_order_routes(state: AppState) -> Router {
    Router::new()
        .route(ORDERS_PATH, get(list_orders).post(create_order))
        .route(
            &format!("{ORDERS_PATH}/{{id}}"),
            get(get_order).delete(delete_order),
        )
        .with_state(state)
}

/// Build health check routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Health check endpoint handler
async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "toro-orders"
    }))
}

/// Assemble the full application: health checks, order routes, any custom
/// routes, wrapped in request tracing and permissive CORS.
pub fn build_router(service: OrderService, custom_routes: Vec<Router>) -> Router {
    let mut app = health_routes().merge(build_order_routes(AppState { service }));

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}
