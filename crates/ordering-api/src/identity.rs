//! Identity resolution for ordering requests.
//!
//! Handlers take a [`CurrentUser`] extractor; the extractor asks the
//! [`IdentityService`] held in [`AppState`] to resolve the caller.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use eshop_core::identity::{IdentityError, TokenValidator};
use secrecy::ExposeSecret;

use crate::config::IdentityConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the buyer identity for a request.
pub trait IdentityService: Send + Sync {
    /// Return the identity (`sub`) of the caller.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` when the request carries no valid credential.
    fn user_identity(&self, parts: &Parts) -> Result<String, IdentityError>;
}

/// Identity service backed by HS256 bearer tokens from the identity service.
#[derive(Debug, Clone)]
pub struct JwtIdentityService {
    validator: TokenValidator,
}

impl JwtIdentityService {
    /// Build from configuration; tokens must name `config.url` as issuer.
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            validator: TokenValidator::new(
                config.signing_secret.expose_secret().as_bytes(),
                Some(&config.url),
            ),
        }
    }

    /// Build from an existing validator.
    #[must_use]
    pub const fn from_validator(validator: TokenValidator) -> Self {
        Self { validator }
    }
}

impl IdentityService for JwtIdentityService {
    fn user_identity(&self, parts: &Parts) -> Result<String, IdentityError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        self.validator.verify_header(header).map(|id| id.subject)
    }
}

/// Extractor for the authenticated buyer identity.
///
/// Rejects with 401 when the identity cannot be resolved.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .identity()
            .user_identity(parts)
            .map(Self)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected unauthenticated ordering request");
                AppError::Unauthorized(e.to_string())
            })
    }
}
