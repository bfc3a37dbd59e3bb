//! Integration tests for the eShop services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eshop-integration-tests
//! ```
//!
//! No external services are needed: the ordering router runs against an
//! in-memory query store, and completion providers and the ordering API
//! are stood in for by `wiremock` servers.
//!
//! # Test Categories
//!
//! - `ordering_api` - Orders HTTP surface and identity checks
//! - `webapp_chat` - Chat routes, session handling, order history proxy
//! - `chat_providers` - Tool use loops against a mock Messages API
//! - `apphost_manifest` - Published deployment manifest

use axum::body::Body;
use axum::response::Response;
use eshop_core::identity::{TokenValidator, sign_claims};

/// Signing secret shared by token issuers and validators in tests.
pub const SECRET: &[u8] = b"integration-test-signing-secret-4f9c2a";

/// Issuer the services expect.
pub const ISSUER: &str = "https://identity.test";

/// Validator matching tokens from [`token_for`].
#[must_use]
pub fn validator() -> TokenValidator {
    TokenValidator::new(SECRET, Some(ISSUER))
}

/// Sign a token for `subject` with extra profile claims.
///
/// # Panics
///
/// Panics if signing fails.
#[must_use]
pub fn token_for(subject: &str, claims: &[(&str, &str)]) -> String {
    let mut body = serde_json::json!({
        "sub": subject,
        "iss": ISSUER,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    if let Some(object) = body.as_object_mut() {
        for (key, value) in claims {
            object.insert((*key).to_string(), serde_json::Value::from(*value));
        }
    }
    sign_claims(&body, SECRET).expect("sign test token")
}

/// `Authorization` header value for `subject`.
#[must_use]
pub fn bearer(subject: &str) -> String {
    format!("Bearer {}", token_for(subject, &[]))
}

/// Collect a response body as bytes.
///
/// # Panics
///
/// Panics if the body cannot be read.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

/// Collect a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}
