//! Session middleware configuration.
//!
//! Cookie sessions backed by an in-memory store. The session only carries
//! the id of the browser's chat; chat state itself lives in
//! [`crate::chatbot::ChatSessions`].

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::WebAppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "eshop_webapp_session";

/// Session key holding the chat id.
pub const CHAT_ID_KEY: &str = "chat_id";

/// Session key for the subject the chat was started for.
pub const CHAT_OWNER_KEY: &str = "chat_owner";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer.
#[must_use]
pub fn create_session_layer(config: &WebAppConfig) -> SessionManagerLayer<MemoryStore> {
    session_layer(config.is_secure())
}

/// Session layer with the given cookie security.
#[must_use]
pub fn session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
