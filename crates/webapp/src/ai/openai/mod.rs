//! `OpenAI` Chat Completions provider.
//!
//! Used instead of Claude when `AI__OPENAI__CHATMODEL` names a chat model.

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument};

use eshop_core::ChatRole;

use crate::ai::{ChatTurn, CompletionError, CompletionProvider, CompletionRequest};
use crate::config::{OpenAiAuth, OpenAiConfig};

use types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolSpec};

/// Default Chat Completions endpoint.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// `api-version` query parameter for Azure `OpenAI` deployments.
pub const AZURE_OPENAI_API_VERSION: &str = "2024-06-01";

/// Errors that can occur when calling the `OpenAI` API.
#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status with the API's error message.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// `OpenAI` Chat Completions client.
#[derive(Clone)]
pub struct OpenAiClient {
    inner: Arc<OpenAiClientInner>,
}

struct OpenAiClientInner {
    client: reqwest::Client,
    model: String,
    api_url: String,
}

impl OpenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError::Config` if the API key contains invalid header
    /// characters or the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self, OpenAiError> {
        let key = config.api_key.expose_secret();
        let (name, value) = match config.auth {
            OpenAiAuth::Bearer => (AUTHORIZATION, format!("Bearer {key}")),
            OpenAiAuth::ApiKeyHeader => (HeaderName::from_static("api-key"), key.to_string()),
        };
        let value = HeaderValue::from_str(&value)
            .map_err(|_| OpenAiError::Config("API key is not a valid header value".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(name, value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| OpenAiError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(OpenAiClientInner {
                client,
                model: config.chat_model.clone(),
                api_url: config.api_url.clone(),
            }),
        })
    }

    /// Request one chat completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers with an
    /// error status.
    #[instrument(skip(self, messages, tools), fields(model = %self.inner.model))]
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolSpec>>,
    ) -> Result<ChatCompletionResponse, OpenAiError> {
        let request = ChatCompletionRequest {
            model: self.inner.model.clone(),
            messages,
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
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| OpenAiError::Parse(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn model(&self) -> &str {
        &self.inner.model
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        let mut messages: Vec<ChatMessage> = request.turns.iter().map(to_openai_message).collect();
        let tools: Option<Vec<ToolSpec>> = (request.behavior.offers_tools()
            && !request.tools.is_empty())
        .then(|| request.tools.definitions().into_iter().map(Into::into).collect());

        for iteration in 1..=request.behavior.max_iterations() {
            let response = self.chat(messages.clone(), tools.clone()).await?;
            let choice = response.choices.into_iter().next().ok_or_else(|| {
                CompletionError::InvalidResponse("no choices in response".to_string())
            })?;

            debug!(
                iteration,
                finish_reason = ?choice.finish_reason,
                tool_calls = choice.message.tool_calls.len(),
                "OpenAI response received"
            );

            if tools.is_none() || choice.message.tool_calls.is_empty() {
                return Ok(choice.message.content.unwrap_or_default());
            }

            let calls = choice.message.tool_calls.clone();
            messages.push(choice.message);
            for call in calls {
                let (content, _is_error) = match call.function.parsed_arguments() {
                    Ok(arguments) => {
                        request
                            .tools
                            .invoke_for_model(&call.function.name, &arguments)
                            .await
                    }
                    Err(e) => (format!("Error: invalid arguments: {e}"), true),
                };
                messages.push(ChatMessage::tool_result(call.id, content));
            }
        }

        tracing::warn!("Too many tool iterations, stopping");
        Err(CompletionError::TooManyToolIterations)
    }
}

fn to_openai_message(turn: &ChatTurn) -> ChatMessage {
    let role = match turn.role {
        ChatRole::System => "system",
        ChatRole::Assistant => "assistant",
        ChatRole::User => "user",
    };
    ChatMessage::text(role, turn.content.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_openai_message_roles() {
        assert_eq!(to_openai_message(&ChatTurn::system("s")).role, "system");
        assert_eq!(to_openai_message(&ChatTurn::assistant("a")).role, "assistant");
        assert_eq!(to_openai_message(&ChatTurn::user("u")).role, "user");
    }

    #[test]
    fn test_openai_error_display() {
        let err = OpenAiError::Api {
            status: 429,
            message: "Rate limit reached".to_string(),
        };
        assert_eq!(err.to_string(), "API error (429): Rate limit reached");
    }

    #[tokio::test]
    async fn test_azure_auth_sends_api_key_header() {
        use secrecy::SecretString;
        use wiremock::matchers::{header, method};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("api-key", "azure-key-9f3Kq"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "hi"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpenAiClient::new(&OpenAiConfig {
            api_key: SecretString::from("azure-key-9f3Kq"),
            chat_model: "gpt-35-turbo-16k".to_string(),
            api_url: format!("{}/openai/deployments/gpt-35-turbo-16k/chat/completions", server.uri()),
            auth: OpenAiAuth::ApiKeyHeader,
        })
        .expect("client");

        let response = client
            .chat(vec![ChatMessage::text("user", "hello".to_string())], None)
            .await
            .expect("completion");
        assert_eq!(response.choices.len(), 1);

        let requests = server.received_requests().await.expect("recorded");
        assert!(requests[0].headers.get("authorization").is_none());
    }
}
