use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Remote catalog (can override CLI)
    pub catalog_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_command: Option<String>,
    pub schema: Option<String>,
    pub request_timeout_sec: Option<u64>,
    pub conditional_writes: Option<bool>,

    // Feature configs
    pub transcription: Option<TranscriptionConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Shell command printing the API key (e.g. `pass show openai`).
    pub api_key_command: Option<String>,
    pub timeout_sec: Option<u64>,
    pub max_tokens: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
