//! Application state shared across handlers.

use std::sync::Arc;

use eshop_core::identity::TokenValidator;

use crate::ai::CompletionProvider;
use crate::chatbot::ChatSessions;
use crate::ordering::OrderingService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    provider: Arc<dyn CompletionProvider>,
    ordering: OrderingService,
    chats: ChatSessions,
    tokens: TokenValidator,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        ordering: OrderingService,
        chats: ChatSessions,
        tokens: TokenValidator,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                provider,
                ordering,
                chats,
                tokens,
            }),
        }
    }

    /// Get the completion provider used by new chats.
    #[must_use]
    pub fn provider(&self) -> Arc<dyn CompletionProvider> {
        Arc::clone(&self.inner.provider)
    }

    /// Get the ordering API client.
    #[must_use]
    pub fn ordering(&self) -> &OrderingService {
        &self.inner.ordering
    }

    /// Get the live chat sessions.
    #[must_use]
    pub fn chats(&self) -> &ChatSessions {
        &self.inner.chats
    }

    /// Get the bearer token validator.
    #[must_use]
    pub fn tokens(&self) -> &TokenValidator {
        &self.inner.tokens
    }
}
