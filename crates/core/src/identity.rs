//! Bearer token validation for tokens issued by the identity service.
//!
//! Both the ordering API and the web front-end accept HS256-signed JWTs. The
//! `sub` claim identifies the buyer; profile claims are exposed through
//! [`UserProfileClaims`].

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::UserProfileClaims;

/// Errors raised while validating a bearer token.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No `Authorization: Bearer` header on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Token failed signature, expiry, issuer or audience checks.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but carries no subject.
    #[error("token has no subject claim")]
    MissingSubject,

    /// Signing or key handling failed on our side.
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Identity resolved from a validated token.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// The `sub` claim.
    pub subject: String,
    /// Profile claims carried by the token.
    pub profile: UserProfileClaims,
    /// The raw token, for forwarding to downstream services.
    pub token: String,
}

/// Validates bearer tokens against a shared signing secret.
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("key", &"[REDACTED]")
            .field("issuer", &self.validation.iss)
            .finish()
    }
}

impl TokenValidator {
    /// Create a validator for HS256 tokens.
    ///
    /// When `issuer` is given, tokens must carry a matching `iss` claim. The
    /// audience is not checked.
    #[must_use]
    pub fn new(secret: &[u8], issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validate a raw token.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::InvalidToken` for malformed, expired or
    /// wrongly signed tokens, and `IdentityError::MissingSubject` when the
    /// token has no `sub` claim.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;

        let subject = data
            .claims
            .get("sub")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or(IdentityError::MissingSubject)?
            .to_owned();

        Ok(VerifiedIdentity {
            subject,
            profile: UserProfileClaims::from_json(&data.claims),
            token: token.to_owned(),
        })
    }

    /// Validate the value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::MissingToken` if the header is absent or not a
    /// bearer credential, otherwise the errors of [`Self::verify`].
    pub fn verify_header(&self, header: Option<&str>) -> Result<VerifiedIdentity, IdentityError> {
        let token = header
            .and_then(bearer_token)
            .ok_or(IdentityError::MissingToken)?;
        self.verify(token)
    }
}

/// Extract the token from a `Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Sign a claim set with the shared secret.
///
/// Used by local tooling and tests; production tokens come from the identity
/// service.
///
/// # Errors
///
/// Returns `IdentityError::Signing` if the claims cannot be encoded.
pub fn sign_claims(claims: &Value, secret: &[u8]) -> Result<String, IdentityError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| IdentityError::Signing(e.to_string()))
}
