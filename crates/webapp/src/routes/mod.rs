//! HTTP route handlers for the web app.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness check
//!
//! # Chat concierge (bearer token required)
//! GET    /chat                     - Current transcript (starts a chat on first use)
//! POST   /chat/messages            - Send a message, returns the transcript
//! POST   /chat/messages/stream     - Send a message, streams transcript updates (SSE)
//! DELETE /chat                     - Discard the chat
//!
//! # Orders (bearer token required)
//! GET    /user/orders              - Signed-in user's orders
//! ```

pub mod chat;
pub mod orders;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(chat::router())
        .merge(orders::router())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
