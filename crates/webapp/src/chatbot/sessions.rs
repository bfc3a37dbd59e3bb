//! In-memory store of live chat sessions.
//!
//! Each browser session owns at most one [`ChatState`], keyed by a chat id
//! kept in the session cookie. States sit behind an async mutex so a second
//! submission waits for the first to finish. Idle chats expire.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::ChatState;

/// Upper bound on concurrently held chats.
const MAX_CHATS: u64 = 10_000;

/// A chat shared between requests of one browser session.
pub type SharedChat = Arc<Mutex<ChatState>>;

/// Live chat sessions with idle expiry.
#[derive(Clone)]
pub struct ChatSessions {
    cache: Cache<Uuid, SharedChat>,
}

impl ChatSessions {
    /// Create a store whose chats expire after `idle_timeout` without access.
    #[must_use]
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_CHATS)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }

    /// Look up a chat.
    pub async fn get(&self, id: &Uuid) -> Option<SharedChat> {
        self.cache.get(id).await
    }

    /// Return the chat for `id`, starting one with `start` if there is none.
    pub async fn get_or_start<F>(&self, id: Uuid, start: F) -> SharedChat
    where
        F: FnOnce() -> ChatState,
    {
        self.cache
            .get_with(id, async move { Arc::new(Mutex::new(start())) })
            .await
    }

    /// Discard a chat.
    pub async fn remove(&self, id: &Uuid) {
        self.cache.invalidate(id).await;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use eshop_core::UserProfileClaims;

    use super::*;
    use crate::ai::{CompletionError, CompletionProvider, CompletionRequest};

    struct Silent;

    #[async_trait]
    impl CompletionProvider for Silent {
        fn model(&self) -> &str {
            "silent"
        }

        async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, CompletionError> {
            Ok(String::new())
        }
    }

    fn start() -> ChatState {
        ChatState::start(Arc::new(Silent), UserProfileClaims::default())
    }

    #[tokio::test]
    async fn test_get_or_start_reuses_chat() {
        let sessions = ChatSessions::new(Duration::from_secs(60));
        let id = Uuid::new_v4();

        let first = sessions.get_or_start(id, start).await;
        let second = sessions.get_or_start(id, || panic!("should reuse")).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_remove_discards_chat() {
        let sessions = ChatSessions::new(Duration::from_secs(60));
        let id = Uuid::new_v4();

        sessions.get_or_start(id, start).await;
        sessions.remove(&id).await;
        assert!(sessions.get(&id).await.is_none());
    }
}
