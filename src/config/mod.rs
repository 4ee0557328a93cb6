mod file_config;
mod secret;

pub use file_config::{FileConfig, TranscriptionConfig};
pub use secret::{SecretError, SecretSource};

use crate::blob_store::WebDavConfig;
use crate::catalog::CatalogSchema;
use crate::llm::{CompletionOptions, OpenAIProvider};
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SEC: u64 = 30;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_TIMEOUT_SEC: u64 = 120;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub catalog_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub schema: Option<CatalogSchema>,
    pub request_timeout_sec: Option<u64>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog_url: String,
    pub username: Option<String>,
    pub password: SecretSource,
    pub schema: CatalogSchema,
    pub request_timeout: Duration,
    pub conditional_writes: bool,

    pub transcription: TranscriptionSettings,
}

#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: SecretSource,
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
}

impl TranscriptionSettings {
    /// Scanning and asking are only offered when an API key is configured or
    /// a non-default endpoint (e.g. a local server) was chosen.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_none() || self.base_url != DEFAULT_LLM_BASE_URL
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            max_tokens: self.max_tokens,
            timeout: self.timeout,
            ..CompletionOptions::default()
        }
    }

    pub fn provider(&self) -> OpenAIProvider {
        OpenAIProvider::new(&self.base_url, &self.model, self.api_key.clone())
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_url = file
            .catalog_url
            .or_else(|| cli.catalog_url.clone())
            .ok_or_else(|| {
                anyhow!("catalog_url must be specified via --catalog-url or in config file")
            })?;
        if !catalog_url.starts_with("http://") && !catalog_url.starts_with("https://") {
            bail!("catalog_url must be an http(s) URL: {}", catalog_url);
        }

        let username = file.username.or_else(|| cli.username.clone());
        let password = SecretSource::from_parts(
            file.password.or_else(|| cli.password.clone()),
            file.password_command,
        );

        let schema = match file.schema {
            Some(s) => parse_schema(&s).ok_or_else(|| anyhow!("Unknown catalog schema: {}", s))?,
            None => cli.schema.unwrap_or_default(),
        };

        let request_timeout = Duration::from_secs(
            file.request_timeout_sec
                .or(cli.request_timeout_sec)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SEC),
        );
        let conditional_writes = file.conditional_writes.unwrap_or(true);

        // Transcription settings - merge file config with defaults
        let tr_file = file.transcription.unwrap_or_default();
        let transcription = TranscriptionSettings {
            base_url: tr_file
                .base_url
                .or_else(|| cli.llm_base_url.clone())
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: tr_file
                .model
                .or_else(|| cli.llm_model.clone())
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_key: SecretSource::from_parts(
                tr_file.api_key.or_else(|| cli.llm_api_key.clone()),
                tr_file.api_key_command,
            ),
            timeout: Duration::from_secs(tr_file.timeout_sec.unwrap_or(DEFAULT_LLM_TIMEOUT_SEC)),
            max_tokens: tr_file.max_tokens,
        };

        Ok(Self {
            catalog_url,
            username,
            password,
            schema,
            request_timeout,
            conditional_writes,
            transcription,
        })
    }

    pub fn webdav_config(&self) -> WebDavConfig {
        WebDavConfig {
            url: self.catalog_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: self.request_timeout,
        }
    }
}

/// Accepts both `title_author_location` (TOML style) and `title-author-location`.
fn parse_schema(s: &str) -> Option<CatalogSchema> {
    CatalogSchema::from_str(&s.trim().replace('_', "-"), true).ok()
}
