//! Claude API client for chat interactions.
//!
//! Non-streaming access to the Anthropic Messages API, plus the
//! [`CompletionProvider`] implementation that runs the tool use loop.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use eshop_core::ChatRole;

use crate::ai::{ChatTurn, CompletionError, CompletionProvider, CompletionRequest};
use crate::config::ClaudeConfig;

use super::error::ClaudeError;
use super::types::{ChatRequest, ChatResponse, ContentBlock, Message, MessageContent, Tool};

/// Default Messages API endpoint.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Claude API client.
///
/// Cheaply cloneable; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    model: String,
    api_url: String,
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError::Config` if the API key contains invalid header
    /// characters or the HTTP client cannot be built.
    pub fn new(config: &ClaudeConfig) -> Result<Self, ClaudeError> {
        let api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| ClaudeError::Config("API key is not a valid header value".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ClaudeError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                model: config.model.clone(),
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// Send a chat request and get a complete response.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, messages, system, tools), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Option<Vec<Tool>>,
    ) -> Result<ChatResponse, ClaudeError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
            tools,
        };

        let response = self
            .inner
            .client
            .post(&self.inner.api_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ClaudeError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(error_from_status(status, response).await)
        }
    }
}

#[async_trait]
impl CompletionProvider for ClaudeClient {
    fn model(&self) -> &str {
        &self.inner.model
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        let (system, mut messages) = to_claude_messages(request.turns);
        let tools: Option<Vec<Tool>> = (request.behavior.offers_tools()
            && !request.tools.is_empty())
        .then(|| request.tools.definitions().into_iter().map(Into::into).collect());

        for iteration in 1..=request.behavior.max_iterations() {
            let response = self
                .chat(messages.clone(), system.clone(), tools.clone())
                .await?;

            debug!(
                iteration,
                stop_reason = ?response.stop_reason,
                content_blocks = response.content.len(),
                output_tokens = response.usage.output_tokens,
                "Claude response received"
            );

            if tools.is_none() || !response.wants_tools() {
                return Ok(response.text());
            }

            let mut tool_results = Vec::new();
            for block in &response.content {
                if let ContentBlock::ToolUse { id, name, input } = block {
                    let (content, is_error) = request.tools.invoke_for_model(name, input).await;
                    tool_results.push(ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content,
                        is_error: Some(is_error),
                    });
                }
            }

            messages.push(Message::blocks("assistant", response.content));
            messages.push(Message::blocks("user", tool_results));
        }

        tracing::warn!("Too many tool iterations, stopping");
        Err(CompletionError::TooManyToolIterations)
    }
}

/// Build a `ClaudeError` from a non-success response.
async fn error_from_status(status: reqwest::StatusCode, response: reqwest::Response) -> ClaudeError {
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match response.text().await {
        Ok(body) => ClaudeError::from_status(status.as_u16(), retry_after.as_deref(), &body),
        Err(e) => ClaudeError::Http(e),
    }
}

/// Split a transcript into the system prompt and Messages API turns.
///
/// The Messages API wants the conversation to open with a user turn, so
/// assistant turns before the first user turn (the fixed greeting) are not
/// sent. Consecutive turns with the same role are merged.
fn to_claude_messages(turns: &[ChatTurn]) -> (Option<String>, Vec<Message>) {
    let system: Vec<&str> = turns
        .iter()
        .filter(|t| t.role == ChatRole::System)
        .map(|t| t.content.as_str())
        .collect();
    let system = (!system.is_empty()).then(|| system.join("\n\n"));

    let mut messages: Vec<Message> = Vec::new();
    for turn in turns.iter().filter(|t| t.role != ChatRole::System) {
        let role = match turn.role {
            ChatRole::User => "user",
            _ => "assistant",
        };
        if messages.is_empty() && role == "assistant" {
            continue;
        }

        if let Some(last) = messages.last_mut()
            && last.role == role
            && let MessageContent::Text(text) = &mut last.content
        {
            text.push_str("\n\n");
            text.push_str(&turn.content);
            continue;
        }
        messages.push(Message::text(role, turn.content.clone()));
    }

    (system, messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(message: &Message) -> &str {
        match &message.content {
            MessageContent::Text(text) => text,
            MessageContent::Blocks(_) => panic!("expected text content"),
        }
    }

    #[test]
    fn test_to_claude_messages_splits_system_and_skips_greeting() {
        let turns = [
            ChatTurn::system("You are a concierge."),
            ChatTurn::assistant("Hi! How can I help?"),
            ChatTurn::user("Do you sell skis?"),
        ];

        let (system, messages) = to_claude_messages(&turns);
        assert_eq!(system.as_deref(), Some("You are a concierge."));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(text_of(&messages[0]), "Do you sell skis?");
    }

    #[test]
    fn test_to_claude_messages_merges_same_role_runs() {
        let turns = [
            ChatTurn::user("Hello"),
            ChatTurn::user("Anyone there?"),
            ChatTurn::assistant("Yes!"),
        ];

        let (system, messages) = to_claude_messages(&turns);
        assert!(system.is_none());
        assert_eq!(messages.len(), 2);
        assert_eq!(text_of(&messages[0]), "Hello\n\nAnyone there?");
        assert_eq!(messages[1].role, "assistant");
    }

    #[tokio::test]
    async fn test_rate_limited_response_reads_retry_after() {
        use secrecy::SecretString;
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "12")
                    .set_body_json(serde_json::json!({
                        "type": "error",
                        "error": {"type": "rate_limit_error", "message": "Slow down"}
                    })),
            )
            .mount(&server)
            .await;

        let client = ClaudeClient::new(&ClaudeConfig {
            api_key: SecretString::from("sk-ant-test-key"),
            model: "claude-test".to_string(),
            api_url: format!("{}/v1/messages", server.uri()),
        })
        .expect("client");

        let err = client
            .chat(vec![Message::text("user", "hi".to_string())], None, None)
            .await
            .expect_err("rate limited");
        assert!(matches!(err, ClaudeError::RateLimited(12)));
    }

    #[test]
    fn test_claude_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ClaudeClient>();
    }
}
