//! Authentication extractor for the web app.
//!
//! Requests carry an identity-service bearer token. Its claims become the
//! chat's profile snapshot, and the raw token is forwarded to the ordering
//! API.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use eshop_core::identity::VerifiedIdentity;

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> String {
///     format!("Hello, {}!", user.subject)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser(pub VerifiedIdentity);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        state
            .tokens()
            .verify_header(header)
            .map(Self)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected unauthenticated request");
                AppError::Unauthorized(e.to_string())
            })
    }
}
