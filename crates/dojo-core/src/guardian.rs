//! A Guardian wraps a chat backend with a fixed system prompt and an
//! accumulating conversation history.
//!
//! The source this grew from carried two reset methods, `reset` and
//! `resetFull`, with identical bodies. They are collapsed here into
//! [`Guardian::reset_conversation`].

use std::sync::Arc;

use dojo_shared::{ChatBackend, ChatMessage, DojoResult};

pub struct Guardian {
    prompt_id: String,
    system_prompt: String,
    backend: Arc<dyn ChatBackend>,
    history: Vec<ChatMessage>,
}

impl Guardian {
    #[must_use]
    pub fn new(prompt_id: impl Into<String>, system_prompt: impl Into<String>, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            system_prompt: system_prompt.into(),
            backend,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn prompt_id(&self) -> &str {
        &self.prompt_id
    }

    /// Sends `content` as the next user turn, including the system prompt
    /// and any accumulated history, and records both the user turn and the
    /// assistant's reply into `history`.
    pub async fn respond(&mut self, content: impl Into<String>) -> DojoResult<String> {
        let user_message = ChatMessage::user(content);
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());
        messages.push(user_message.clone());

        let reply = self.backend.chat(&messages).await?;

        self.history.push(user_message);
        self.history.push(ChatMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Clears accumulated history so the next scenario starts uncontaminated.
    pub fn reset_conversation(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn chat(&self, messages: &[ChatMessage]) -> DojoResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("saw {} messages", messages.len()))
        }
    }

    #[tokio::test]
    async fn respond_accumulates_history_across_calls() {
        let backend = Arc::new(EchoBackend { calls: AtomicUsize::new(0) });
        let mut guardian = Guardian::new("p1", "You are a Guardian.", backend);

        let first = guardian.respond("hello").await.unwrap();
        assert_eq!(first, "saw 2 messages"); // system + user
        assert_eq!(guardian.history_len(), 2);

        let second = guardian.respond("again").await.unwrap();
        assert_eq!(second, "saw 4 messages"); // system + 2 history + user
        assert_eq!(guardian.history_len(), 4);
    }

    #[tokio::test]
    async fn reset_conversation_clears_history() {
        let backend = Arc::new(EchoBackend { calls: AtomicUsize::new(0) });
        let mut guardian = Guardian::new("p1", "You are a Guardian.", backend);
        guardian.respond("hello").await.unwrap();
        guardian.reset_conversation();
        assert_eq!(guardian.history_len(), 0);
    }
}
