//! Ordering API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ConnectionStrings__orderingdb` - `PostgreSQL` connection string, either a
//!   `postgres://` URL or `Host=…;Port=…;Username=…;Password=…;Database=…`
//!   keyword form (falls back to `DATABASE_URL`)
//! - `Identity__Url` - Identity service base URL (expected token issuer)
//! - `IDENTITY_SIGNING_SECRET` - Shared secret used to validate bearer tokens
//!
//! ## Optional
//! - `ORDERING_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDERING_PORT` - Listen port (default: 5224)
//! - `ORDERING_RUN_MIGRATIONS` - Apply migrations at startup (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Ordering API configuration.
#[derive(Debug, Clone)]
pub struct OrderingConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Identity service configuration
    pub identity: IdentityConfig,
    /// Whether to apply migrations at startup
    pub run_migrations: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Identity service settings used for bearer token validation.
///
/// Implements `Debug` manually to redact the signing secret.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Identity service base URL; tokens must name it as issuer
    pub url: String,
    /// Shared HS256 signing secret
    pub signing_secret: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("signing_secret", &"[REDACTED]")
            .finish()
    }
}

impl OrderingConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ConnectionStrings__orderingdb")?;
        let host = get_env_or_default("ORDERING_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERING_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ORDERING_PORT", "5224")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ORDERING_PORT".to_string(), e.to_string()))?;
        let identity = IdentityConfig::from_env()?;
        let run_migrations = parse_bool(
            "ORDERING_RUN_MIGRATIONS",
            &get_env_or_default("ORDERING_RUN_MIGRATIONS", "true"),
        )?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            identity,
            run_migrations,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl IdentityConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = get_required_env("Identity__Url")?;
        Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("Identity__Url".to_string(), e.to_string()))?;

        Ok(Self {
            url,
            signing_secret: get_validated_secret("IDENTITY_SIGNING_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Get the database URL, falling back to generic `DATABASE_URL`.
///
/// Keyword-form connection strings (as injected by the app host) are
/// converted to a `postgres://` URL.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    let (key, value) = std::env::var(primary_key)
        .map(|v| (primary_key, v))
        .or_else(|_| std::env::var("DATABASE_URL").map(|v| ("DATABASE_URL", v)))
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))?;

    normalize_connection_string(&value)
        .map(SecretString::from)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

/// Convert a connection string to a `postgres://` URL.
///
/// URLs pass through unchanged. Keyword form accepts `Host`, `Server`,
/// `Port`, `Username`, `User ID`, `Password`, `Database` (case-insensitive).
fn normalize_connection_string(value: &str) -> Result<String, String> {
    let value = value.trim();
    if value.starts_with("postgres://") || value.starts_with("postgresql://") {
        return Ok(value.to_string());
    }

    let mut parts: HashMap<String, String> = HashMap::new();
    for pair in value.split(';').filter(|p| !p.trim().is_empty()) {
        let (key, val) = pair
            .split_once('=')
            .ok_or_else(|| format!("malformed segment '{pair}'"))?;
        parts.insert(key.trim().to_ascii_lowercase(), val.trim().to_string());
    }

    let host = parts
        .get("host")
        .or_else(|| parts.get("server"))
        .ok_or("missing Host")?;
    let mut url = Url::parse(&format!("postgres://{host}")).map_err(|e| e.to_string())?;

    if let Some(port) = parts.get("port") {
        let port = port.parse::<u16>().map_err(|e| format!("invalid Port: {e}"))?;
        url.set_port(Some(port)).map_err(|()| "cannot set port")?;
    }
    if let Some(user) = parts.get("username").or_else(|| parts.get("user id")) {
        url.set_username(user).map_err(|()| "cannot set username")?;
    }
    if let Some(password) = parts.get("password") {
        url.set_password(Some(password))
            .map_err(|()| "cannot set password")?;
    }
    if let Some(database) = parts.get("database") {
        url.set_path(database);
    }

    Ok(url.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
