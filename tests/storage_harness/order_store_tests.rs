//! Macro-generated test suite for `OrderStore` contract validation.
//!
//! The `order_store_tests!` macro generates a test module that drives any
//! `OrderStore` implementation through `OrderService` and directly.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//!
//! use storage_harness::*;
//! use toro::storage::InMemoryOrderStore;
//!
//! order_store_tests!(InMemoryOrderStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Create
//! - `test_create_and_get`: created order reads back identical
//! - `test_first_order_of_the_year`: TORO-YYYY-001 in `created` state
//! - `test_numbers_are_sequential`: 001, 002, 003
//! - `test_numbering_restarts_each_year`: the sequence resets on Jan 1st
//! - `test_missing_field_writes_nothing`: validation failure leaves the store unchanged
//! - `test_phone_format`: `555-1234` rejected, `+7-911-222-33-44` accepted
//! - `test_timestamps_round_trip`: microseconds survive storage
//!
//! ## List
//! - `test_list_empty`
//! - `test_list_by_priority`: two of three orders are `high`
//! - `test_list_combined_filters`: predicates are ANDed
//! - `test_list_by_status`: rows inserted with a non-default status
//! - `test_list_is_ordered_by_id`
//!
//! ## Get / Delete
//! - `test_get_nonexistent`
//! - `test_delete_twice`: second delete is NotFound
//! - `test_deleted_numbers_are_not_reused`
//!
//! ## Concurrency
//! - `test_concurrent_creates_get_distinct_numbers`

/// Generate a full `OrderStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to a fresh, empty store
/// implementing `OrderStore + Clone + 'static`. It is re-evaluated for each
/// test to ensure isolation.
#[macro_export]
macro_rules! order_store_tests {
    ($factory:expr) => {
        mod order_store_contract_tests {
            use super::*;
            use std::sync::Arc;
            use toro::core::error::{OrderError, ToroError};
            use toro::core::order::{Priority, Status};
            use toro::core::query::OrderFilter;
            use toro::core::service::OrderService;
            use toro::core::store::OrderStore;

            fn service_for<S: OrderStore + 'static>(store: S, year: i32) -> OrderService {
                OrderService::new(Arc::new(store)).with_clock(clock_in(year))
            }

            fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            }

            // ==================================================================
            // Create
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let service = service_for($factory, 2025);

                let created = service.create(&sample_payload()).await.unwrap();
                let fetched = service.get(created.id).await.unwrap();

                assert_eq!(fetched, created);
                assert_eq!(fetched.equipment_type, "Станок ЧПУ");
                assert_eq!(fetched.department, "Цех №1");
                assert_eq!(fetched.priority, Priority::High);
            }

            #[tokio::test]
            async fn test_first_order_of_the_year() {
                let service = service_for($factory, 2025);

                let order = service.create(&sample_payload()).await.unwrap();

                assert_eq!(order.order_number.to_string(), "TORO-2025-001");
                assert_eq!(order.status, Status::Created);
                assert_eq!(order.created_at, order.updated_at);
            }

            #[tokio::test]
            async fn test_numbers_are_sequential() {
                let service = service_for($factory, 2025);

                let mut numbers = Vec::new();
                for _ in 0..3 {
                    let order = service.create(&sample_payload()).await.unwrap();
                    numbers.push(order.order_number.to_string());
                }

                assert_eq!(
                    numbers,
                    vec!["TORO-2025-001", "TORO-2025-002", "TORO-2025-003"]
                );
            }

            #[tokio::test]
            async fn test_numbering_restarts_each_year() {
                let clock = clock_in(2025);
                let service = OrderService::new(Arc::new($factory)).with_clock(clock.clone());

                service.create(&sample_payload()).await.unwrap();
                service.create(&sample_payload()).await.unwrap();

                clock.set(instant_in(2026));
                let order = service.create(&sample_payload()).await.unwrap();
                assert_eq!(order.order_number.to_string(), "TORO-2026-001");

                clock.set(instant_in(2025));
                let order = service.create(&sample_payload()).await.unwrap();
                assert_eq!(order.order_number.to_string(), "TORO-2025-003");
            }

            #[tokio::test]
            async fn test_missing_field_writes_nothing() {
                let service = service_for($factory, 2025);
                service.create(&sample_payload()).await.unwrap();
                let before = service.store().count().await.unwrap();

                let err = service
                    .create(&payload_without("equipment_type"))
                    .await
                    .unwrap_err();

                assert_eq!(err.error_code(), "VALIDATION_FAILED");
                assert_eq!(service.store().count().await.unwrap(), before);

                // The failed attempt consumed no number.
                let next = service.create(&sample_payload()).await.unwrap();
                assert_eq!(next.order_number.to_string(), "TORO-2025-002");
            }

            #[tokio::test]
            async fn test_phone_format() {
                let service = service_for($factory, 2025);

                let err = service
                    .create(&payload_with(serde_json::json!({ "contact_phone": "555-1234" })))
                    .await
                    .unwrap_err();
                match err {
                    ToroError::Validation(v) => assert!(v.has_field("contact_phone")),
                    other => panic!("expected a validation error, got {other:?}"),
                }

                let order = service
                    .create(&payload_with(serde_json::json!({ "contact_phone": "+7-911-222-33-44" })))
                    .await
                    .unwrap();
                assert_eq!(order.contact_phone, "+7-911-222-33-44");
            }

            #[tokio::test]
            async fn test_timestamps_round_trip() {
                let at = instant_in(2025) + chrono::Duration::microseconds(654_321);
                let service = OrderService::new(Arc::new($factory))
                    .with_clock(toro::core::service::FixedClock::at(at));

                let created = service.create(&sample_payload()).await.unwrap();
                let fetched = service.get(created.id).await.unwrap();

                assert_eq!(created.created_at, at);
                assert_eq!(fetched.created_at, at);
                assert_eq!(fetched.updated_at, at);
            }

            // ==================================================================
            // List
            // ==================================================================

            #[tokio::test]
            async fn test_list_empty() {
                let service = service_for($factory, 2025);
                let response = service.list(&[]).await.unwrap();
                assert_count(&response.orders, 0);
                assert_eq!(response.total, 0);
            }

            #[tokio::test]
            async fn test_list_by_priority() {
                let service = service_for($factory, 2025);
                for priority in ["high", "high", "low"] {
                    service
                        .create(&payload_with(serde_json::json!({ "priority": priority })))
                        .await
                        .unwrap();
                }

                let response = service.list(&params(&[("priority", "high")])).await.unwrap();
                assert_eq!(response.total, 2);
                assert!(response.orders.iter().all(|o| o.priority == Priority::High));

                let response = service.list(&[]).await.unwrap();
                assert_eq!(response.total, 3);
            }

            #[tokio::test]
            async fn test_list_combined_filters() {
                let service = service_for($factory, 2025);
                for (priority, department) in [
                    ("high", "Цех №1"),
                    ("high", "Цех №2"),
                    ("low", "Цех №1"),
                ] {
                    service
                        .create(&payload_with(serde_json::json!({
                            "priority": priority,
                            "department": department
                        })))
                        .await
                        .unwrap();
                }

                let response = service
                    .list(&params(&[("priority", "high"), ("department", "Цех №1")]))
                    .await
                    .unwrap();
                assert_eq!(response.total, 1);
                assert_eq!(response.orders[0].department, "Цех №1");
                assert_eq!(response.orders[0].priority, Priority::High);

                let response = service
                    .list(&params(&[("department", "Цех №9")]))
                    .await
                    .unwrap();
                assert_eq!(response.total, 0);
            }

            #[tokio::test]
            async fn test_list_by_status() {
                let store = $factory;
                store
                    .insert(sample_draft(2025, Priority::Low, "Цех №1"))
                    .await
                    .unwrap();
                let in_progress = store
                    .insert(sample_draft(2025, Priority::Low, "Цех №1").with_status(Status::InProgress))
                    .await
                    .unwrap();

                let filter = OrderFilter::default().with_status(Status::InProgress);
                let orders = store.list(&filter).await.unwrap();
                assert_eq!(orders, vec![in_progress]);

                let filter = OrderFilter::default().with_status(Status::Completed);
                assert_count(&store.list(&filter).await.unwrap(), 0);
            }

            #[tokio::test]
            async fn test_list_is_ordered_by_id() {
                let store = $factory;
                for _ in 0..5 {
                    store
                        .insert(sample_draft(2025, Priority::Medium, "Цех №1"))
                        .await
                        .unwrap();
                }

                let orders = store.list(&OrderFilter::default()).await.unwrap();
                let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
                let mut sorted = ids.clone();
                sorted.sort();
                assert_eq!(ids, sorted);
                assert_count(&orders, 5);
            }

            // ==================================================================
            // Get / Delete
            // ==================================================================

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                let err = store.get(999_999).await.unwrap_err();
                assert!(matches!(
                    err,
                    ToroError::Order(OrderError::NotFound { id: 999_999 })
                ));
            }

            #[tokio::test]
            async fn test_delete_twice() {
                let service = service_for($factory, 2025);
                let order = service.create(&sample_payload()).await.unwrap();

                service.delete(order.id).await.unwrap();
                let err = service.delete(order.id).await.unwrap_err();
                assert!(matches!(err, ToroError::Order(OrderError::NotFound { .. })));

                let err = service.get(order.id).await.unwrap_err();
                assert_eq!(err.error_code(), "ORDER_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_deleted_numbers_are_not_reused() {
                let service = service_for($factory, 2025);
                let first = service.create(&sample_payload()).await.unwrap();
                let second = service.create(&sample_payload()).await.unwrap();
                service.delete(second.id).await.unwrap();
                service.delete(first.id).await.unwrap();

                let third = service.create(&sample_payload()).await.unwrap();
                assert_eq!(third.order_number.to_string(), "TORO-2025-003");
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_creates_get_distinct_numbers() {
                let service = service_for($factory, 2025).with_max_create_attempts(20);

                let mut handles = Vec::new();
                for _ in 0..40 {
                    let service = service.clone();
                    handles.push(tokio::spawn(async move {
                        service.create(&sample_payload()).await
                    }));
                }

                let mut numbers = Vec::new();
                for handle in handles {
                    let order = handle.await.unwrap().unwrap();
                    numbers.push(order.order_number.to_string());
                }

                assert_unique(&numbers);
                assert_eq!(service.store().count().await.unwrap(), 40);

                let mut sequences: Vec<u32> = numbers
                    .iter()
                    .map(|n| n.rsplit('-').next().unwrap().parse().unwrap())
                    .collect();
                sequences.sort();
                assert_eq!(sequences, (1..=40).collect::<Vec<u32>>());
            }
        }
    };
}
