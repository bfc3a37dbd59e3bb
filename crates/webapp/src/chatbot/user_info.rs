//! `get_user_info` capability exposed to the completion provider.

use async_trait::async_trait;

use eshop_core::UserProfileClaims;

use crate::ai::{Tool, ToolDefinition, ToolError};

/// Tool name the model calls.
pub const GET_USER_INFO: &str = "get_user_info";

/// Returns the signed-in user's profile claims as JSON.
///
/// Claims are captured when the chat session starts. Absent claims are
/// reported as empty strings.
#[derive(Debug, Clone)]
pub struct UserInfoTool {
    profile: UserProfileClaims,
}

impl UserInfoTool {
    #[must_use]
    pub const fn new(profile: UserProfileClaims) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl Tool for UserInfoTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::without_parameters(GET_USER_INFO, "Gets information about the chat user")
    }

    async fn invoke(&self, _input: &serde_json::Value) -> Result<String, ToolError> {
        serde_json::to_string(&self.profile.user_info())
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}
