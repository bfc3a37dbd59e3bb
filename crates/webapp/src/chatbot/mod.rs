//! Northern Mountains chat concierge.
//!
//! - [`ChatState`] - one conversation and its turn cycle
//! - [`Transcript`] - append-only turns behind a fixed system instruction
//! - [`UserInfoTool`] - profile lookup the model may call
//! - [`ChatSessions`] - live chats per browser session

mod sessions;
mod state;
mod transcript;
mod user_info;

pub use sessions::{ChatSessions, SharedChat};
pub use state::{APOLOGY, ChatPhase, ChatState, GREETING, STORE_NAME, system_prompt};
pub use transcript::Transcript;
pub use user_info::{GET_USER_INFO, UserInfoTool};
