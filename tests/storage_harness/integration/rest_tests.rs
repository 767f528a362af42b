//! REST integration test macro for storage backends.
//!
//! The `rest_integration_tests!` macro generates HTTP-level tests that validate
//! an `OrderStore` through full REST round-trips:
//! JSON → HTTP request → handler → OrderService → HTTP response → JSON.

/// Generate a REST integration test suite for a storage backend.
///
/// `$store_factory` must produce a fresh `impl OrderStore + 'static`.
///
/// # Generated Tests
///
/// ## Create (4 tests)
/// - `test_rest_create`: POST 201 + numbered order in `created` state
/// - `test_rest_create_validation_error`: every violation listed under `details.fields`
/// - `test_rest_create_malformed_json`: 400 INVALID_BODY
/// - `test_rest_create_non_object`: 400 VALIDATION_FAILED on `body`
///
/// ## Read (5 tests)
/// - `test_rest_get`: GET 200 + same body as the create response
/// - `test_rest_get_not_found`: GET unknown id → 404
/// - `test_rest_get_invalid_id`: GET with garbage id → 400
/// - `test_rest_list_filter`: `?priority=high` returns two of three
/// - `test_rest_list_invalid_filter`: bad value or unknown parameter → 400
///
/// ## Delete (1 test)
/// - `test_rest_delete`: DELETE 204, then GET and DELETE 404
#[macro_export]
macro_rules! rest_integration_tests {
    ($store_factory:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use serde_json::{Value, json};
            use crate::storage_harness::integration::build_test_server;

            async fn make_server() -> TestServer {
                build_test_server($store_factory)
            }

            async fn create(server: &TestServer, payload: Value) -> Value {
                let response = server.post("/api/v1/orders").json(&payload).await;
                response.assert_status(StatusCode::CREATED);
                response.json()
            }

            // ==============================================================
            // Create
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let body = create(&server, sample_payload()).await;

                assert!(body["id"].is_i64());
                assert_eq!(body["order_number"], "TORO-2025-001");
                assert_eq!(body["status"], "created");
                assert_eq!(body["priority"], "high");
                assert_eq!(body["equipment_type"], "Станок ЧПУ");
                assert_eq!(body["created_at"], body["updated_at"]);
                assert!(body["created_at"].as_str().unwrap().ends_with('Z'));
            }

            #[tokio::test]
            async fn test_rest_create_validation_error() {
                let server = make_server().await;

                let mut payload = payload_without("department");
                payload["contact_phone"] = json!("555-1234");

                let response = server.post("/api/v1/orders").json(&payload).await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_FAILED");
                assert!(!body["message"].as_str().unwrap().is_empty());
                let fields: Vec<&str> = body["details"]["fields"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|v| v["field"].as_str().unwrap())
                    .collect();
                assert_eq!(fields, vec!["department", "contact_phone"]);

                let list: Value = server.get("/api/v1/orders").await.json();
                assert_eq!(list["total"], 0);
            }

            #[tokio::test]
            async fn test_rest_create_malformed_json() {
                let server = make_server().await;

                let response = server
                    .post("/api/v1/orders")
                    .text("{\"equipment_type\": ")
                    .content_type("application/json")
                    .await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "INVALID_BODY");
            }

            #[tokio::test]
            async fn test_rest_create_non_object() {
                let server = make_server().await;

                let response = server.post("/api/v1/orders").json(&json!([1, 2, 3])).await;

                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_FAILED");
                assert_eq!(body["details"]["fields"][0]["field"], "body");
            }

            // ==============================================================
            // Read
            // ==============================================================

            #[tokio::test]
            async fn test_rest_get() {
                let server = make_server().await;
                let created = create(&server, sample_payload()).await;
                let id = created["id"].as_i64().unwrap();

                let response = server.get(&format!("/api/v1/orders/{id}")).await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body, created);
            }

            #[tokio::test]
            async fn test_rest_get_not_found() {
                let server = make_server().await;

                let response = server.get("/api/v1/orders/424242").await;
                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["code"], "ORDER_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_rest_get_invalid_id() {
                let server = make_server().await;

                let response = server.get("/api/v1/orders/not-a-number").await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "INVALID_ID");
            }

            #[tokio::test]
            async fn test_rest_list_filter() {
                let server = make_server().await;
                for priority in ["high", "low", "high"] {
                    create(&server, payload_with(json!({ "priority": priority }))).await;
                }

                let response = server
                    .get("/api/v1/orders")
                    .add_query_param("priority", "high")
                    .await;
                response.assert_status(StatusCode::OK);
                let body: Value = response.json();
                assert_eq!(body["total"], 2);
                assert_eq!(body["orders"].as_array().unwrap().len(), 2);

                let body: Value = server
                    .get("/api/v1/orders")
                    .add_query_param("department", "Цех №1")
                    .add_query_param("status", "created")
                    .await
                    .json();
                assert_eq!(body["total"], 3);
            }

            #[tokio::test]
            async fn test_rest_list_invalid_filter() {
                let server = make_server().await;

                let response = server
                    .get("/api/v1/orders")
                    .add_query_param("priority", "urgent")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_FAILED");

                let response = server
                    .get("/api/v1/orders")
                    .add_query_param("page", "2")
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
            }

            // ==============================================================
            // Delete
            // ==============================================================

            #[tokio::test]
            async fn test_rest_delete() {
                let server = make_server().await;
                let created = create(&server, sample_payload()).await;
                let path = format!("/api/v1/orders/{}", created["id"]);

                server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
                server.get(&path).await.assert_status(StatusCode::NOT_FOUND);

                let response = server.delete(&path).await;
                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["code"], "ORDER_NOT_FOUND");
            }
        }
    };
}
