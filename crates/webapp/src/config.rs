//! Web app configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `IdentityUrl` - Identity service base URL (expected token issuer)
//! - `IDENTITY_SIGNING_SECRET` - Shared secret used to validate bearer tokens
//! - `services__ordering-api__http__0` - Ordering API base URL (falls back to
//!   `ORDERING_API_URL`)
//! - `CLAUDE_API_KEY` - Anthropic API key, unless `OpenAI` is selected
//!
//! ## Optional
//! - `WEBAPP_HOST` - Bind address (default: 127.0.0.1)
//! - `WEBAPP_PORT` - Listen port (default: 5045)
//! - `WEBAPP_BASE_URL` - Public URL (falls back to `CallBackUrl`, then
//!   `http://localhost:5045`)
//! - `CLAUDE_MODEL` - Claude model ID (default: claude-sonnet-4-20250514)
//! - `CLAUDE_API_URL` - Messages API endpoint override
//! - `AI__OPENAI__CHATMODEL` - Selects `OpenAI` with this chat model
//! - `ConnectionStrings__openai` - `OpenAI` account as `Key=<api key>` (api.openai.com)
//!   or `Endpoint=https://<name>.openai.azure.com/;Key=<api key>` (Azure `OpenAI`)
//! - `OPENAI_API_KEY` / `OPENAI_API_URL` - Used when the connection string has no
//!   `Key` / no `Endpoint`
//! - `CHAT_IDLE_MINUTES` - Minutes before an idle chat is dropped (default: 30, min: 1)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::ai::claude::ANTHROPIC_API_URL;
use crate::ai::openai::{AZURE_OPENAI_API_VERSION, OPENAI_CHAT_URL};

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const OPENAI_CONNECTION_STRING: &str = "ConnectionStrings__openai";

/// Environment lookup the loaders read from.
type Env<'a> = &'a dyn Fn(&str) -> Option<String>;

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

/// Web app configuration.
#[derive(Debug, Clone)]
pub struct WebAppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of this app (used for cookie security)
    pub base_url: String,
    /// Identity service configuration
    pub identity: IdentityConfig,
    /// Ordering API base URL
    pub ordering_url: Url,
    /// Completion provider configuration
    pub ai: AiConfig,
    /// Idle time after which a chat session is discarded
    pub chat_idle_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Identity service settings.
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

/// Which completion provider backs the chat concierge.
#[derive(Debug, Clone)]
pub enum AiConfig {
    Claude(ClaudeConfig),
    OpenAi(OpenAiConfig),
}

/// Claude AI API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID (e.g., claude-sonnet-4-20250514)
    pub model: String,
    /// Messages API endpoint
    pub api_url: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// How the `OpenAI` API key is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenAiAuth {
    /// `Authorization: Bearer <key>` (api.openai.com)
    #[default]
    Bearer,
    /// `api-key: <key>` (Azure `OpenAI`)
    ApiKeyHeader,
}

/// `OpenAI` API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// `OpenAI` API key
    pub api_key: SecretString,
    /// Chat model or deployment name
    pub chat_model: String,
    /// Chat Completions endpoint
    pub api_url: String,
    pub auth: OpenAiAuth,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[REDACTED]")
            .field("chat_model", &self.chat_model)
            .field("api_url", &self.api_url)
            .field("auth", &self.auth)
            .finish()
    }
}

impl WebAppConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`WebAppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env: Env<'_> = &lookup;

        let host = get_env_or_default(env, "WEBAPP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WEBAPP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(env, "WEBAPP_PORT", "5045")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WEBAPP_PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env(env, "WEBAPP_BASE_URL")
            .or_else(|| get_optional_env(env, "CallBackUrl"))
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let identity = IdentityConfig::from_env(env)?;
        let ordering_url = get_ordering_url(env)?;
        let ai = AiConfig::from_env(env)?;
        let chat_idle_timeout =
            parse_idle_timeout(&get_env_or_default(env, "CHAT_IDLE_MINUTES", "30"))
                .map_err(|e| ConfigError::InvalidEnvVar("CHAT_IDLE_MINUTES".to_string(), e))?;
        let sentry_dsn = get_optional_env(env, "SENTRY_DSN");
        let sentry_environment = get_optional_env(env, "SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env(env, "SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env(env, "SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            identity,
            ordering_url,
            ai,
            chat_idle_timeout,
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

    /// Whether the app is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl IdentityConfig {
    fn from_env(env: Env<'_>) -> Result<Self, ConfigError> {
        let url = get_required_env(env, "IdentityUrl")?;
        Url::parse(&url)
            .map_err(|e| ConfigError::InvalidEnvVar("IdentityUrl".to_string(), e.to_string()))?;

        Ok(Self {
            url,
            signing_secret: get_validated_secret(env, "IDENTITY_SIGNING_SECRET")?,
        })
    }
}

impl AiConfig {
    fn from_env(env: Env<'_>) -> Result<Self, ConfigError> {
        match get_optional_env(env, "AI__OPENAI__CHATMODEL").filter(|m| !m.trim().is_empty()) {
            Some(chat_model) => OpenAiConfig::from_env(env, chat_model).map(Self::OpenAi),
            None => Ok(Self::Claude(ClaudeConfig {
                api_key: get_validated_secret(env, "CLAUDE_API_KEY")?,
                model: get_env_or_default(env, "CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
                api_url: get_env_or_default(env, "CLAUDE_API_URL", ANTHROPIC_API_URL),
            })),
        }
    }

    /// Model or deployment name of the selected provider.
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::Claude(c) => &c.model,
            Self::OpenAi(o) => &o.chat_model,
        }
    }
}

impl OpenAiConfig {
    /// Resolve the account from `ConnectionStrings__openai`, falling back to
    /// `OPENAI_API_KEY` and `OPENAI_API_URL` for the parts it leaves out.
    fn from_env(env: Env<'_>, chat_model: String) -> Result<Self, ConfigError> {
        let parts = get_optional_env(env, OPENAI_CONNECTION_STRING)
            .map(|raw| {
                OpenAiConnectionString::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar(OPENAI_CONNECTION_STRING.to_string(), e)
                })
            })
            .transpose()?
            .unwrap_or_default();

        let api_key = match parts.key {
            Some(key) => {
                validate_secret_strength(&key, OPENAI_CONNECTION_STRING)?;
                SecretString::from(key)
            }
            None => get_validated_secret(env, "OPENAI_API_KEY")?,
        };

        let (api_url, auth) = match parts.endpoint {
            Some(endpoint) => (
                azure_chat_url(&endpoint, &chat_model).map_err(|e| {
                    ConfigError::InvalidEnvVar(OPENAI_CONNECTION_STRING.to_string(), e)
                })?,
                OpenAiAuth::ApiKeyHeader,
            ),
            None => (
                get_env_or_default(env, "OPENAI_API_URL", OPENAI_CHAT_URL),
                OpenAiAuth::Bearer,
            ),
        };

        Ok(Self {
            api_key,
            chat_model,
            api_url,
            auth,
        })
    }
}

/// The parts of an `openai` connection string this app understands.
#[derive(Debug, Default, PartialEq, Eq)]
struct OpenAiConnectionString {
    key: Option<String>,
    endpoint: Option<String>,
}

impl OpenAiConnectionString {
    /// Parse `Name=Value` pairs separated by `;`. Names are case-insensitive
    /// and unknown names are skipped.
    fn parse(value: &str) -> Result<Self, String> {
        let mut parts = Self::default();
        for pair in value.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("expected Name=Value, got '{pair}'"))?;
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.trim().to_ascii_lowercase().as_str() {
                "key" => parts.key = Some(value.to_string()),
                "endpoint" => parts.endpoint = Some(value.to_string()),
                _ => {}
            }
        }
        Ok(parts)
    }
}

/// Chat Completions URL of an Azure `OpenAI` deployment.
fn azure_chat_url(endpoint: &str, deployment: &str) -> Result<String, String> {
    parse_base_url(endpoint)?
        .join(&format!(
            "openai/deployments/{deployment}/chat/completions?api-version={AZURE_OPENAI_API_VERSION}"
        ))
        .map(String::from)
        .map_err(|e| e.to_string())
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(env: Env<'_>, key: &str) -> Result<String, ConfigError> {
    env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(env: Env<'_>, key: &str) -> Option<String> {
    env(key)
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: Env<'_>, key: &str, default: &str) -> String {
    env(key).unwrap_or_else(|| default.to_string())
}

/// Parse the chat idle timeout in whole minutes; zero is rejected.
fn parse_idle_timeout(minutes: &str) -> Result<Duration, String> {
    let minutes = minutes.trim().parse::<u64>().map_err(|e| e.to_string())?;
    if minutes == 0 {
        return Err("must be at least 1 minute".to_string());
    }
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("{minutes} minutes is too large"))
}

/// Resolve the ordering API URL from service discovery, then the explicit
/// override.
fn get_ordering_url(env: Env<'_>) -> Result<Url, ConfigError> {
    const DISCOVERY_KEY: &str = "services__ordering-api__http__0";
    const OVERRIDE_KEY: &str = "ORDERING_API_URL";

    let (key, value) = get_optional_env(env, DISCOVERY_KEY)
        .map(|v| (DISCOVERY_KEY, v))
        .or_else(|| get_optional_env(env, OVERRIDE_KEY).map(|v| (OVERRIDE_KEY, v)))
        .ok_or_else(|| ConfigError::MissingEnvVar(DISCOVERY_KEY.to_string()))?;

    parse_base_url(&value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e))
}

/// Parse a base URL, making sure it ends in `/` so relative joins keep the
/// full path.
pub(crate) fn parse_base_url(value: &str) -> Result<Url, String> {
    let trimmed = value.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| e.to_string())
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
fn get_validated_secret(env: Env<'_>, key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(env, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    const SIGNING_SECRET: &str = "hQ7vZ2mN9xK4pR8wT3bL6cJ5fY1dG0s";
    const OPENAI_KEY: &str = "sk-Zq8vN2rX5tL9wB4mK7pD3fH6";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// What the app host hands the web app when `OpenAI` comes from a
    /// connection string.
    fn published_openai_env(connection_string: &str) -> Vec<(&'static str, String)> {
        vec![
            ("IdentityUrl", "https://localhost:5243".to_string()),
            ("IDENTITY_SIGNING_SECRET", SIGNING_SECRET.to_string()),
            ("services__ordering-api__http__0", "http://localhost:5224".to_string()),
            ("CallBackUrl", "https://localhost:7298".to_string()),
            ("ASPNETCORE_FORWARDEDHEADERS_ENABLED", "true".to_string()),
            ("AI__OPENAI__CHATMODEL", "gpt-35-turbo-16k".to_string()),
            ("ConnectionStrings__openai", connection_string.to_string()),
        ]
    }

    fn load(pairs: &[(&'static str, String)]) -> Result<WebAppConfig, ConfigError> {
        let pairs: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        WebAppConfig::from_lookup(lookup(&pairs))
    }

    #[test]
    fn test_openai_key_from_connection_string() {
        let config = load(&published_openai_env(&format!("Key={OPENAI_KEY}"))).unwrap();

        let AiConfig::OpenAi(openai) = config.ai else {
            panic!("expected OpenAI");
        };
        assert_eq!(openai.api_key.expose_secret(), OPENAI_KEY);
        assert_eq!(openai.chat_model, "gpt-35-turbo-16k");
        assert_eq!(openai.api_url, OPENAI_CHAT_URL);
        assert_eq!(openai.auth, OpenAiAuth::Bearer);
        assert_eq!(config.base_url, "https://localhost:7298");
    }

    #[test]
    fn test_openai_azure_endpoint_from_connection_string() {
        let config = load(&published_openai_env(&format!(
            "Endpoint=https://eshop.openai.azure.com/;Key={OPENAI_KEY}"
        )))
        .unwrap();

        let AiConfig::OpenAi(openai) = config.ai else {
            panic!("expected OpenAI");
        };
        assert_eq!(
            openai.api_url,
            format!(
                "https://eshop.openai.azure.com/openai/deployments/gpt-35-turbo-16k/chat/completions?api-version={AZURE_OPENAI_API_VERSION}"
            )
        );
        assert_eq!(openai.auth, OpenAiAuth::ApiKeyHeader);
    }

    #[test]
    fn test_openai_falls_back_to_api_key_env() {
        let mut env = published_openai_env("");
        env.retain(|(k, _)| *k != "ConnectionStrings__openai");

        assert!(matches!(
            load(&env),
            Err(ConfigError::MissingEnvVar(key)) if key == "OPENAI_API_KEY"
        ));

        env.push(("OPENAI_API_KEY", OPENAI_KEY.to_string()));
        env.push(("OPENAI_API_URL", "http://127.0.0.1:8089/v1/chat/completions".to_string()));
        let AiConfig::OpenAi(openai) = load(&env).unwrap().ai else {
            panic!("expected OpenAI");
        };
        assert_eq!(openai.api_url, "http://127.0.0.1:8089/v1/chat/completions");
    }

    #[test]
    fn test_openai_connection_string_parse() {
        assert_eq!(
            OpenAiConnectionString::parse("key=abc=;ENDPOINT = https://x/ ;Deployment=d").unwrap(),
            OpenAiConnectionString {
                key: Some("abc=".to_string()),
                endpoint: Some("https://x/".to_string()),
            }
        );
        assert!(OpenAiConnectionString::parse("just-a-key").is_err());
    }

    #[test]
    fn test_claude_selected_without_chat_model() {
        let config = WebAppConfig::from_lookup(lookup(&[
            ("IdentityUrl", "https://localhost:5243"),
            ("IDENTITY_SIGNING_SECRET", SIGNING_SECRET),
            ("ORDERING_API_URL", "http://localhost:5224"),
            ("CLAUDE_API_KEY", OPENAI_KEY),
        ]))
        .unwrap();

        assert!(matches!(config.ai, AiConfig::Claude(_)));
        assert_eq!(config.ordering_url.as_str(), "http://localhost:5224/");
        assert_eq!(config.chat_idle_timeout, Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_parse_idle_timeout() {
        assert_eq!(parse_idle_timeout("5").unwrap(), Duration::from_secs(300));
        assert!(parse_idle_timeout("0").is_err());
        assert!(parse_idle_timeout(&u64::MAX.to_string()).is_err());
        assert!(parse_idle_timeout("soon").is_err());
    }

    #[test]
    fn test_zero_idle_minutes_rejected() {
        let result = WebAppConfig::from_lookup(lookup(&[
            ("IdentityUrl", "https://localhost:5243"),
            ("IDENTITY_SIGNING_SECRET", SIGNING_SECRET),
            ("ORDERING_API_URL", "http://localhost:5224"),
            ("CLAUDE_API_KEY", OPENAI_KEY),
            ("CHAT_IDLE_MINUTES", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "CHAT_IDLE_MINUTES"
        ));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("http://localhost:5224").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5224/");
        assert_eq!(
            url.join("api/v1/orders/").unwrap().as_str(),
            "http://localhost:5224/api/v1/orders/"
        );
    }

    #[test]
    fn test_parse_base_url_keeps_path_prefix() {
        let url = parse_base_url("https://gateway.local/ordering").unwrap();
        assert_eq!(
            url.join("api/v1/orders/").unwrap().as_str(),
            "https://gateway.local/ordering/api/v1/orders/"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_shannon_entropy() {
        assert!(shannon_entropy("aaaaaaaaaa") < 0.1);
        let high_entropy = "aB3$xY9!mK2@nL5#pQ7&";
        assert!(shannon_entropy(high_entropy) > 4.0);
    }

    #[test]
    fn test_validate_secret_rejects_placeholders() {
        assert!(validate_secret_strength("your-api-key-here", "TEST_VAR").is_err());
        assert!(validate_secret_strength("sk-REPLACE-me-0123456789", "TEST_VAR").is_err());
    }

    #[test]
    fn test_ai_config_model() {
        let claude = AiConfig::Claude(ClaudeConfig {
            api_key: SecretString::from("k"),
            model: "claude-sonnet-4-20250514".to_string(),
            api_url: ANTHROPIC_API_URL.to_string(),
        });
        assert_eq!(claude.model(), "claude-sonnet-4-20250514");

        let openai = AiConfig::OpenAi(OpenAiConfig {
            api_key: SecretString::from("k"),
            chat_model: "gpt-35-turbo-16k".to_string(),
            api_url: OPENAI_CHAT_URL.to_string(),
            auth: OpenAiAuth::Bearer,
        });
        assert_eq!(openai.model(), "gpt-35-turbo-16k");
    }

    #[test]
    fn test_config_debug_redacts_keys() {
        let config = ClaudeConfig {
            api_key: SecretString::from("sk-ant-very-secret"),
            model: "claude-sonnet-4-20250514".to_string(),
            api_url: ANTHROPIC_API_URL.to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("sk-ant-very-secret"));
    }
}
