use anyhow::{anyhow, Result};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AppConfig;

const JSON_UTF8: &str = "application/json; charset=utf-8";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
}

/// Upstream response. Only `message.content` is read; both levels may be
/// missing and that simply means no content.
#[derive(Debug, Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    message: Option<EnvelopeMessage>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatEnvelope {
    fn into_content(self) -> String {
        self.message
            .and_then(|message| message.content)
            .unwrap_or_default()
    }
}

/// Client for an Ollama-style `/api/chat` endpoint. One POST per call,
/// never retried.
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.ollama_url.clone(),
            model: config.model.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends `prompt` as the system message and `content` as the user message,
    /// returning `message.content` from the reply (empty when absent).
    pub async fn call(&self, prompt: &str, content: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
            stream: false,
        };
        let payload = serde_json::to_vec(&body)?;

        info!(url = %self.url, model = %self.model, "sending request to model service");
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("model service returned {status}: {text}"));
        }

        let envelope: ChatEnvelope = response.json().await?;
        let content = envelope.into_content();
        info!("received response from model service");
        debug!(chars = content.chars().count(), "model output size");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{refused_url, test_config, FakeUpstream};
    use axum::http::StatusCode;

    #[test]
    fn envelope_without_content_is_empty() {
        let cases = [r#"{}"#, r#"{"message": {}}"#, r#"{"message": null}"#, r#"{"message": {"content": null}}"#];
        for raw in cases {
            let envelope: ChatEnvelope = serde_json::from_str(raw).unwrap();
            assert_eq!(envelope.into_content(), "", "case {raw}");
        }
    }

    #[tokio::test]
    async fn sends_two_messages_without_streaming() {
        let upstream =
            FakeUpstream::start(StatusCode::OK, r#"{"message": {"content": "Once upon a time"}}"#)
                .await;
        let client = OllamaClient::new(&test_config(&upstream.url));

        let out = client.call("be a writer", "dragons").await.unwrap();
        assert_eq!(out, "Once upon a time");

        let calls = upstream.calls();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.content_type.as_deref(), Some(JSON_UTF8));
        assert_eq!(call.body["model"], "test-model");
        assert_eq!(call.body["stream"], false);
        let messages = call.body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "be a writer");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "dragons");
    }

    #[tokio::test]
    async fn missing_content_path_yields_empty_text() {
        let upstream = FakeUpstream::start(StatusCode::OK, r#"{"done": true}"#).await;
        let client = OllamaClient::new(&test_config(&upstream.url));
        assert_eq!(client.call("p", "c").await.unwrap(), "");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let upstream =
            FakeUpstream::start(StatusCode::NOT_FOUND, r#"{"error": "model not found"}"#).await;
        let client = OllamaClient::new(&test_config(&upstream.url));
        let err = client.call("p", "c").await.unwrap_err();
        assert!(err.to_string().contains("404"));
        assert_eq!(upstream.calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let upstream = FakeUpstream::start(StatusCode::OK, "not json").await;
        let client = OllamaClient::new(&test_config(&upstream.url));
        assert!(client.call("p", "c").await.is_err());
    }

    #[tokio::test]
    async fn non_string_content_is_an_error() {
        let upstream = FakeUpstream::start(StatusCode::OK, r#"{"message": {"content": 42}}"#).await;
        let client = OllamaClient::new(&test_config(&upstream.url));
        assert!(client.call("p", "c").await.is_err());
    }

    #[tokio::test]
    async fn connection_refused_is_an_error() {
        let url = refused_url().await;
        let client = OllamaClient::new(&test_config(&url));
        assert!(client.call("p", "c").await.is_err());
    }
}
