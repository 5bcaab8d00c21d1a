use std::sync::Arc;

use axum::{routing::post, Router};

use crate::inference::OllamaClient;

pub mod error;
pub mod handlers;
pub mod types;

use handlers::{generate_outline, generate_story, generate_storyline};

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<OllamaClient>,
}

impl AppState {
    pub fn new(model: OllamaClient) -> Self {
        Self {
            model: Arc::new(model),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate_outline", post(generate_outline))
        .route("/generate_storyline", post(generate_storyline))
        .route("/generate_story", post(generate_story))
}
