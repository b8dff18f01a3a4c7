use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ChatError;

pub const CHAT_PATH: &str = "/api/chat";

/// Anything that can turn one user message into one bot reply
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, ChatError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: Option<String>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Like `new`, but every request gives up after `timeout`
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, CHAT_PATH)
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send(&self, message: &str) -> Result<String, ChatError> {
        let url = self.endpoint();
        tracing::debug!(%url, len = message.len(), "posting chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChatError::Transport(format!(
                "chat request failed with status: {}",
                response.status()
            )));
        }

        let chat_response: ChatResponse = response.json().await?;
        match chat_response.response {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(ChatError::Response("reply text is empty".to_string())),
            None => Err(ChatError::Response("missing `response` field".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        assert_eq!(
            ChatClient::new("http://localhost:8000/").endpoint(),
            "http://localhost:8000/api/chat"
        );
        assert_eq!(
            ChatClient::new("http://localhost:8000").endpoint(),
            "http://localhost:8000/api/chat"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(ChatRequest { message: "hello" }).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hello" }));
    }
}
