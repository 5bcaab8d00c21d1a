use axum::{body::Bytes, extract::State, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::{
    gateway::{
        error::GatewayError,
        types::{OutlineRequest, StoryRequest, StorylineRequest},
        AppState,
    },
    prompts::{StoryInput, StoryTask},
};

pub async fn generate_outline(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let req: OutlineRequest = accept(StoryTask::Outline, &body)?;
    generate(&state, StoryInput::Outline { theme: &req.theme }).await
}

pub async fn generate_storyline(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let req: StorylineRequest = accept(StoryTask::Storyline, &body)?;
    generate(
        &state,
        StoryInput::Storyline {
            outline: &req.outline,
        },
    )
    .await
}

pub async fn generate_story(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let req: StoryRequest = accept(StoryTask::Story, &body)?;
    generate(
        &state,
        StoryInput::Story {
            outline: &req.outline,
            storyline: &req.storyline,
        },
    )
    .await
}

/// Parses the body as JSON whatever the `Content-Type`. An unreadable body
/// counts as missing input.
fn accept<T: DeserializeOwned>(task: StoryTask, body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|err| {
        warn!(task = task.output_field(), error = %err, "rejected request body");
        GatewayError::InvalidInput(task.missing_input_detail())
    })
}

/// validate -> build prompt -> one upstream call -> map result
async fn generate(state: &AppState, input: StoryInput<'_>) -> Result<Json<Value>, GatewayError> {
    let task = input.task();
    let failure = GatewayError::InternalFailure(task.failure_detail());

    if input.is_incomplete() {
        warn!(task = task.output_field(), "{}", task.missing_input_detail());
        return Err(GatewayError::InvalidInput(task.missing_input_detail()));
    }

    info!(task = task.output_field(), input = ?input, "generation requested");

    let prompt = match input.prompt() {
        Ok(prompt) => prompt,
        Err(err) => {
            error!(task = task.output_field(), error = %err, "failed to render prompt");
            return Err(failure);
        }
    };

    info!(task = task.output_field(), upstream = state.model.url(), "dispatching to model");
    let text = match state.model.call(&prompt, &input.user_content()).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            error!(task = task.output_field(), "model returned no content");
            return Err(failure);
        }
        Err(err) => {
            error!(task = task.output_field(), error = %err, "model request failed");
            return Err(failure);
        }
    };

    info!(task = task.output_field(), "generation succeeded");

    let mut body = Map::new();
    body.insert(task.output_field().to_string(), Value::String(text));
    Ok(Json(Value::Object(body)))
}
