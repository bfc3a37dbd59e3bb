//! HTTP route handlers for the ordering API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database round trip)
//!
//! # Orders (bearer token required)
//! GET  /api/v1/orders/              - Orders of the current user
//! GET  /api/v1/orders/cardtypes     - Card types
//! GET  /api/v1/orders/{orderId}     - Single order (404 on any failure)
//! ```

pub mod orders;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Base path of the orders API.
pub const ORDERS_BASE_PATH: &str = "/api/v1/orders";

/// Orders API routes.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route(ORDERS_BASE_PATH, get(orders::get_orders_by_user))
        .route("/api/v1/orders/", get(orders::get_orders_by_user))
        .route("/api/v1/orders/cardtypes", get(orders::get_card_types))
        .route("/api/v1/orders/{order_id}", get(orders::get_order))
}

/// Build the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(order_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the ordering store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.queries().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
