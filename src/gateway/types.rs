use serde::Deserialize;

// Missing fields become empty strings and are rejected by the handler.

#[derive(Debug, Deserialize)]
pub struct OutlineRequest {
    #[serde(default)]
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct StorylineRequest {
    #[serde(default)]
    pub outline: String,
}

#[derive(Debug, Deserialize)]
pub struct StoryRequest {
    #[serde(default)]
    pub outline: String,
    #[serde(default)]
    pub storyline: String,
}
