//! Integration test infrastructure for storage backends.
//!
//! Builds the production router over a given store so backends can be
//! validated through the full REST layer
//! (HTTP → handler → OrderService → OrderStore → response).
//!
//! # Architecture
//!
//! ```text
//! axum_test::TestServer
//!     └─ Router (built by ServerBuilder)
//!         ├─ POST   /api/v1/orders        → create_order
//!         ├─ GET    /api/v1/orders        → list_orders
//!         ├─ GET    /api/v1/orders/{id}   → get_order
//!         └─ DELETE /api/v1/orders/{id}   → delete_order
//! ```

#[macro_use]
pub mod rest_tests;

use super::clock_in;
use axum_test::TestServer;
use toro::core::store::OrderStore;
use toro::server::ServerBuilder;

/// Year every test server's clock is pinned to
pub const TEST_YEAR: i32 = 2025;

/// Serve `store` through the real router with the clock pinned to [`TEST_YEAR`]
pub fn build_test_server(store: impl OrderStore + 'static) -> TestServer {
    let router = ServerBuilder::new()
        .with_store(store)
        .with_clock(clock_in(TEST_YEAR))
        .build()
        .expect("router builds with a store");
    TestServer::new(router)
}
