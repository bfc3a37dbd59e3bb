//! Anthropic Claude completion provider.

mod client;
mod error;
pub mod types;

pub use client::{ANTHROPIC_API_URL, ClaudeClient};
pub use error::ClaudeError;
