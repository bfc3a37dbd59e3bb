//! Chat session state machine.
//!
//! A session alternates between awaiting user input and awaiting a
//! completion. Each user turn costs exactly one provider round trip (plus
//! whatever bounded tool calls the provider makes), and provider failures
//! never escape: they become a fixed apology turn.

use std::sync::Arc;

use askama::Template;
use serde::Serialize;
use tracing::{debug, error, instrument};

use eshop_core::UserProfileClaims;

use crate::ai::{ChatTurn, CompletionProvider, CompletionRequest, ToolCallBehavior, ToolRegistry};

use super::transcript::Transcript;
use super::user_info::UserInfoTool;

/// Store the concierge represents.
pub const STORE_NAME: &str = "Northern Mountains";

/// First assistant turn of every session.
pub const GREETING: &str = "Hi! I'm the Northern Mountains Concierge. How can I help?";

/// Assistant turn appended when the provider fails.
pub const APOLOGY: &str = "My apologies, but I encountered an unexpected error.";

/// System prompt template for the concierge.
#[derive(Template)]
#[template(path = "chatbot/system_prompt.txt")]
struct SystemPromptTemplate<'a> {
    store_name: &'a str,
}

/// Render the system prompt template.
#[must_use]
pub fn system_prompt() -> String {
    SystemPromptTemplate {
        store_name: STORE_NAME,
    }
    .render()
    .unwrap_or_else(|_| format!("You are a customer service agent for {STORE_NAME}."))
}

/// Where the session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatPhase {
    AwaitingInput,
    AwaitingCompletion,
}

/// One user's conversation with the concierge.
///
/// Not safe for overlapping submissions on its own; callers share it behind
/// an async mutex (see [`super::ChatSessions`]).
pub struct ChatState {
    provider: Arc<dyn CompletionProvider>,
    tools: ToolRegistry,
    behavior: ToolCallBehavior,
    transcript: Transcript,
    phase: ChatPhase,
}

impl std::fmt::Debug for ChatState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatState")
            .field("model", &self.provider.model())
            .field("tools", &self.tools)
            .field("turns", &self.transcript.len())
            .field("phase", &self.phase)
            .finish()
    }
}

impl ChatState {
    /// Start a session: system instruction, then the greeting.
    ///
    /// The user's profile claims are captured now and served to the model
    /// through the `get_user_info` tool.
    #[must_use]
    pub fn start(provider: Arc<dyn CompletionProvider>, profile: UserProfileClaims) -> Self {
        debug!(model = provider.model(), "Starting chat session");

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(UserInfoTool::new(profile)));

        let mut transcript = Transcript::new(system_prompt());
        transcript.push(ChatTurn::assistant(GREETING));

        Self {
            provider,
            tools,
            behavior: ToolCallBehavior::auto_invoke(),
            transcript,
            phase: ChatPhase::AwaitingInput,
        }
    }

    /// Override how the provider may use tools.
    #[must_use]
    pub fn with_tool_behavior(mut self, behavior: ToolCallBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub const fn phase(&self) -> ChatPhase {
        self.phase
    }

    #[must_use]
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one user turn.
    ///
    /// Appends the user turn and calls `on_change`, asks the provider for a
    /// reply, appends it (or [`APOLOGY`] on failure), then calls `on_change`
    /// again. A blank reply appends nothing. Never fails.
    #[instrument(skip_all, fields(turns = self.transcript.len()))]
    pub async fn submit_user_message<F>(&mut self, text: &str, mut on_change: F)
    where
        F: FnMut(&Self) + Send,
    {
        self.transcript.push(ChatTurn::user(text));
        self.phase = ChatPhase::AwaitingCompletion;
        on_change(self);

        let request = CompletionRequest {
            turns: self.transcript.turns(),
            tools: &self.tools,
            behavior: self.behavior,
        };

        match self.provider.complete(request).await {
            Ok(reply) if reply.trim().is_empty() => {
                debug!("Completion provider returned a blank reply");
            }
            Ok(reply) => self.transcript.push(ChatTurn::assistant(reply)),
            Err(e) => {
                error!(error = %e, "Error getting chat completion");
                self.transcript.push(ChatTurn::assistant(APOLOGY));
            }
        }

        self.phase = ChatPhase::AwaitingInput;
        on_change(self);
    }
}
