//! HTTP server: routes, handlers and the builder that wires them

pub mod builder;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::{ORDERS_PATH, build_order_routes, build_router, health_routes};
