//! Completion providers for the chat concierge.
//!
//! A [`CompletionProvider`] turns a transcript into the next assistant reply.
//! When the request allows it, the provider may call registered tools (see
//! [`ToolRegistry`]) any number of times, up to a fixed bound, before it
//! answers.
//!
//! Two providers are available:
//!
//! - [`claude::ClaudeClient`] - Anthropic Messages API (default)
//! - [`openai::OpenAiClient`] - `OpenAI` Chat Completions API

pub mod claude;
pub mod openai;
pub mod tools;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use eshop_core::ChatRole;

pub use claude::{ClaudeClient, ClaudeError};
pub use openai::{OpenAiClient, OpenAiError};
pub use tools::{Tool, ToolDefinition, ToolError, ToolRegistry};

/// Default bound on model round trips when tools are auto-invoked.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;

/// One role-tagged message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Whether the provider may call registered tools on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCallBehavior {
    /// Tools are not offered to the model.
    None,
    /// Tools are offered and invoked in-process; the model sees their results
    /// and is asked again, at most `max_iterations` times.
    AutoInvoke { max_iterations: usize },
}

impl ToolCallBehavior {
    /// Auto-invoke with [`DEFAULT_MAX_TOOL_ITERATIONS`].
    #[must_use]
    pub const fn auto_invoke() -> Self {
        Self::AutoInvoke {
            max_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Round trips allowed before giving up.
    #[must_use]
    pub const fn max_iterations(self) -> usize {
        match self {
            Self::None => 1,
            Self::AutoInvoke { max_iterations } => max_iterations,
        }
    }

    /// Whether tools should be sent to the model.
    #[must_use]
    pub const fn offers_tools(self) -> bool {
        matches!(self, Self::AutoInvoke { .. })
    }
}

/// A request for the next assistant reply.
#[derive(Clone, Copy)]
pub struct CompletionRequest<'a> {
    /// Full transcript, system turns included.
    pub turns: &'a [ChatTurn],
    /// Capabilities the model may call.
    pub tools: &'a ToolRegistry,
    pub behavior: ToolCallBehavior,
}

/// Errors that can occur while producing a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Anthropic API failure.
    #[error("Claude API error: {0}")]
    Claude(#[from] ClaudeError),

    /// `OpenAI` API failure.
    #[error("OpenAI API error: {0}")]
    OpenAi(#[from] OpenAiError),

    /// The model kept asking for tools past the iteration bound.
    #[error("too many tool iterations")]
    TooManyToolIterations,

    /// The provider returned something we cannot use.
    #[error("invalid completion: {0}")]
    InvalidResponse(String),
}

/// Produces assistant replies from a transcript.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model or deployment name, for logging.
    fn model(&self) -> &str;

    /// Generate the next assistant reply.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if the provider fails or the tool loop
    /// exceeds its bound.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError>;
}
