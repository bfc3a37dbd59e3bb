//! Errors returned by the Messages API client.

use serde::Deserialize;
use thiserror::Error;

/// Wait applied when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Errors that can occur when calling the Claude API.
#[derive(Debug, Error)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status, with the error type and message from the body
    /// when it has the API's error shape.
    #[error("API error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API key was rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClaudeError {
    /// Classify a non-success response from its status, raw `Retry-After`
    /// header and body text.
    #[must_use]
    pub fn from_status(status: u16, retry_after: Option<&str>, body: &str) -> Self {
        let details = ApiErrorBody::parse(body);
        match status {
            429 => Self::RateLimited(
                retry_after
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            ),
            401 => Self::Unauthorized(
                details.map_or_else(|| "invalid API key".to_string(), |d| d.message),
            ),
            _ => match details {
                Some(d) => Self::Api {
                    status,
                    error_type: d.error_type,
                    message: d.message,
                },
                None => Self::Api {
                    status,
                    error_type: "unknown".to_string(),
                    message: body.to_string(),
                },
            },
        }
    }
}

/// `{"type": "error", "error": {...}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// Error details carried in an API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

impl ApiErrorBody {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLOADED: &str = r#"{
        "type": "error",
        "error": {"type": "overloaded_error", "message": "Overloaded"}
    }"#;

    #[test]
    fn test_rate_limit_uses_retry_after() {
        assert!(matches!(
            ClaudeError::from_status(429, Some("17"), ""),
            ClaudeError::RateLimited(17)
        ));
        assert!(matches!(
            ClaudeError::from_status(429, Some("Wed, 21 Oct 2026 07:28:00 GMT"), ""),
            ClaudeError::RateLimited(DEFAULT_RETRY_AFTER_SECS)
        ));
        assert!(matches!(
            ClaudeError::from_status(429, None, OVERLOADED),
            ClaudeError::RateLimited(DEFAULT_RETRY_AFTER_SECS)
        ));
    }

    #[test]
    fn test_error_body_is_parsed() {
        match ClaudeError::from_status(529, None, OVERLOADED) {
            ClaudeError::Api {
                status,
                error_type,
                message,
            } => {
                assert_eq!(status, 529);
                assert_eq!(error_type, "overloaded_error");
                assert_eq!(message, "Overloaded");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognised_body_kept_verbatim() {
        let err = ClaudeError::from_status(502, None, "<html>Bad Gateway</html>");
        assert_eq!(
            err.to_string(),
            "API error 502 (unknown): <html>Bad Gateway</html>"
        );
    }

    #[test]
    fn test_unauthorized_prefers_api_message() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert!(matches!(
            ClaudeError::from_status(401, None, body),
            ClaudeError::Unauthorized(m) if m == "invalid x-api-key"
        ));
        assert!(matches!(
            ClaudeError::from_status(401, None, ""),
            ClaudeError::Unauthorized(m) if m == "invalid API key"
        ));
    }
}
