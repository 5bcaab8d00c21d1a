//! In-process stand-in for the upstream model service.

use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub content_type: Option<String>,
    pub body: Value,
}

/// Answers every `POST /api/chat` with a fixed status and body and records
/// what it was sent.
pub struct FakeUpstream {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeUpstream {
    pub async fn start(status: StatusCode, reply: &'static str) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorder = calls.clone();

        let app = Router::new().route(
            "/api/chat",
            post(move |headers: HeaderMap, body: Bytes| {
                let recorder = recorder.clone();
                async move {
                    let content_type = headers
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
                    recorder
                        .lock()
                        .unwrap()
                        .push(RecordedCall { content_type, body });
                    (status, [(CONTENT_TYPE, "application/json")], reply)
                }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            url: format!("http://{addr}/api/chat"),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

/// URL of a port that was bound and released, so connecting is refused.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/chat")
}

pub fn test_config(url: &str) -> AppConfig {
    AppConfig {
        ollama_url: url.to_string(),
        model: "test-model".into(),
        bind_addr: "127.0.0.1:0".into(),
    }
}
