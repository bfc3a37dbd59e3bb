//! Errors raised while building or publishing the application model.

use thiserror::Error;

/// Errors that can occur when building the application model.
#[derive(Debug, Error)]
pub enum AppHostError {
    /// Two resources were declared with the same name.
    #[error("resource '{0}' is declared more than once")]
    DuplicateResource(String),

    /// Resource names are lowercase ASCII letters, digits and hyphens,
    /// starting with a letter.
    #[error("invalid resource name '{0}'")]
    InvalidName(String),

    /// A wiring step names a resource that was never declared.
    #[error("'{referenced_by}' references unknown resource '{name}'")]
    UnknownResource { referenced_by: String, name: String },

    /// An endpoint reference names an endpoint the resource does not expose.
    #[error("'{referenced_by}' references unknown endpoint '{resource}.{endpoint}'")]
    UnknownEndpoint {
        referenced_by: String,
        resource: String,
        endpoint: String,
    },

    /// A connection string was requested from a resource that has none.
    #[error("resource '{0}' does not expose a connection string")]
    NoConnectionString(String),

    /// The wiring step only applies to runnable resources.
    #[error("resource '{0}' cannot carry environment or endpoints")]
    NotRunnable(String),

    #[error("failed to serialize manifest as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize manifest as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
