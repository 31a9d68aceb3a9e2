//! The chat backend adapter: an OpenAI-compatible request/response shape,
//! the same `messages` array convention, the same `choices[0].message.content`
//! extraction.

use async_trait::async_trait;
use dojo_shared::{ChatBackend, ChatMessage, ChatRole, DojoError, DojoResult};
use std::time::Duration;

/// An OpenAI-compatible chat-completions backend reached over HTTP.
pub struct HttpChatBackend {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl HttpChatBackend {
    #[must_use]
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.into(),
            model: model.into(),
        }
    }

    fn build_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        let rendered: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                };
                serde_json::json!({ "role": role, "content": m.content })
            })
            .collect();

        serde_json::json!({
            "model": self.model,
            "messages": rendered,
            "stream": false,
        })
    }
}

/// Extracts `choices[0].message.content`, turning a top-level `"error"`
/// object into a real `Err`.
fn parse_chat_content(response_body: &str) -> DojoResult<String> {
    let json: serde_json::Value = serde_json::from_str(response_body)
        .map_err(|e| DojoError::Backend(format!("malformed response body: {e}")))?;

    if let Some(error) = json.get("error") {
        let msg = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Err(DojoError::Backend(msg.to_string()));
    }

    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .map(std::string::ToString::to_string)
        .ok_or_else(|| {
            DojoError::Backend("missing choices[0].message.content in response".to_string())
        })
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn chat(&self, messages: &[ChatMessage]) -> DojoResult<String> {
        let body = self.build_body(messages);
        tracing::debug!(model = %self.model, turns = messages.len(), "chat backend call");

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DojoError::Backend(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DojoError::Backend(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(DojoError::Backend(format!(
                "backend returned status {status}: {text}"
            )));
        }

        parse_chat_content(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_openai_response() {
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "DECISION: BLOCK" } }]
        })
        .to_string();
        assert_eq!(parse_chat_content(&body).unwrap(), "DECISION: BLOCK");
    }

    #[test]
    fn surfaces_backend_error_object() {
        let body = serde_json::json!({ "error": { "message": "rate limited" } }).to_string();
        let err = parse_chat_content(&body).unwrap_err();
        assert!(matches!(err, DojoError::Backend(_)));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn rejects_malformed_response() {
        let err = parse_chat_content("{}").unwrap_err();
        assert!(matches!(err, DojoError::Backend(_)));
    }
}
