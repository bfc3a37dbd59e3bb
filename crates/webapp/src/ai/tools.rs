//! Capability registration for model tool use.
//!
//! Tools are registered explicitly in a [`ToolRegistry`] that travels with
//! each completion request. Providers translate [`ToolDefinition`]s into
//! their wire format and route calls back through [`ToolRegistry::invoke`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

/// Errors raised when invoking a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The model asked for a tool that is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The tool ran but failed.
    #[error("tool execution error: {0}")]
    Execution(String),
}

/// Provider-neutral description of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// A tool that takes no arguments.
    #[must_use]
    pub fn without_parameters(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }
}

/// A capability the model may call.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Run the tool and return its result as text.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Execution` if the tool fails.
    async fn invoke(&self, input: &serde_json::Value) -> Result<String, ToolError>;
}

/// Explicit table of callable tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|t| t.definition().name))
            .finish()
    }
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A later registration with the same name replaces
    /// the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        self.tools.retain(|t| t.definition().name != name);
        self.tools.push(tool);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Definitions of all registered tools, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Invoke a tool by name.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::UnknownTool` if no tool has this name, or the
    /// tool's own error.
    #[instrument(skip(self, input))]
    pub async fn invoke(&self, name: &str, input: &serde_json::Value) -> Result<String, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition().name == name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.invoke(input).await
    }

    /// Invoke a tool and fold failures into an error result for the model.
    ///
    /// Returns the result text and whether it is an error.
    pub async fn invoke_for_model(&self, name: &str, input: &serde_json::Value) -> (String, bool) {
        match self.invoke(name, input).await {
            Ok(result) => (result, false),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool invocation failed");
                (format!("Error: {e}"), true)
            }
        }
    }
}
