use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DojoResult;

/// Who authored a turn in a chat-completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
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

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// The single collaborator that does I/O to a language-model backend.
/// Every other component routes through this trait; failures surface as
/// [`crate::error::DojoError::Backend`] and are always tolerated by the
/// caller.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> DojoResult<String>;
}
