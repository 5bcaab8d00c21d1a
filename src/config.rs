use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_PATH_ENV: &str = "STORY_GATEWAY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Startup configuration. Built once in `main` and handed to the model
/// client by reference; nothing reads it from global state afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Chat endpoint of the upstream model service, e.g. `http://localhost:11434/api/chat`.
    pub ollama_url: String,
    pub model: String,
    pub bind_addr: String,
}

/// Shape of `config.json`. Every field is optional here because the
/// environment may fill the gaps.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    ollama_url: Option<String>,
    model: Option<String>,
    bind_addr: Option<String>,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed config at {}", path.display()))
    }
}

impl AppConfig {
    /// Reads `config.json` (or the file named by `STORY_GATEWAY_CONFIG`) and
    /// applies `OLLAMA_URL`, `OLLAMA_MODEL` and `BIND_ADDR` on top.
    pub fn load() -> Result<Self> {
        let path =
            dotenvy::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file = ConfigFile::read(Path::new(&path))?;
        Self::resolve(file, |key| dotenvy::var(key).ok())
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let ollama_url = env("OLLAMA_URL")
            .or(file.ollama_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("ollama_url is not configured"))?;

        let parsed = Url::parse(&ollama_url)
            .with_context(|| format!("ollama_url is not a valid URL: {ollama_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("ollama_url must use http or https, got {}", parsed.scheme());
        }

        let model = env("OLLAMA_MODEL")
            .or(file.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let bind_addr = env("BIND_ADDR")
            .or(file.bind_addr)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            ollama_url,
            model,
            bind_addr,
        })
    }
}
