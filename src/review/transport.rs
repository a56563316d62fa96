//! Chat-completion wire types and the HTTP transport seam.

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request body for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<ChatMessage>,
    /// Ask the service to keep the reasoning trace in its answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_reasoning: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

/// Raw HTTP outcome handed back to the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Value of the `Retry-After` header, if any
    pub retry_after: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, value: impl Into<String>) -> Self {
        self.retry_after = Some(value.into());
        self
    }

    /// `Retry-After` as whole seconds. Fractional values round up; HTTP dates
    /// and garbage yield `None`.
    pub fn retry_after_secs(&self) -> Option<u64> {
        let value = self.retry_after.as_deref()?.trim();
        value.parse::<u64>().ok().or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| secs.ceil() as u64)
        })
    }
}

/// One HTTP exchange with the completion service.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, TransportError>;

    fn endpoint(&self) -> &str;
}

/// reqwest-backed transport with bearer authentication.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn send(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_openai_shape() {
        let request = ChatCompletionRequest {
            model: "deepseek-ai/deepseek-r1".to_string(),
            temperature: 0.6,
            messages: vec![ChatMessage::user("hello")],
            include_reasoning: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "deepseek-ai/deepseek-r1");
        assert_eq!(value["messages"], json!([{"role": "user", "content": "hello"}]));
        assert!(value.get("include_reasoning").is_none());

        let with_trace = ChatCompletionRequest {
            include_reasoning: Some(true),
            ..request
        };
        let value = serde_json::to_value(&with_trace).unwrap();
        assert_eq!(value["include_reasoning"], true);
    }

    #[test]
    fn retry_after_parsing() {
        let resp = TransportResponse::new(429, "");
        assert_eq!(resp.retry_after_secs(), None);
        assert_eq!(resp.clone().with_retry_after("120").retry_after_secs(), Some(120));
        assert_eq!(resp.clone().with_retry_after(" 1.2 ").retry_after_secs(), Some(2));
        assert_eq!(
            resp.with_retry_after("Wed, 21 Oct 2015 07:28:00 GMT")
                .retry_after_secs(),
            None
        );
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let parsed: ChatCompletionResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(parsed.choices.is_empty());

        let parsed: ChatCompletionResponse = serde_json::from_str(
            r#"{"model": "m", "choices": [{"message": {"content": "hi", "reasoning_content": "why"}}]}"#,
        )
        .unwrap();
        let message = parsed.choices[0].message.as_ref().unwrap();
        assert_eq!(message.content.as_deref(), Some("hi"));
        assert_eq!(message.reasoning_content.as_deref(), Some("why"));
    }
}
