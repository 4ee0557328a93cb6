//! Secrets that can be given inline or fetched from a shell command.

use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Timeout for secret command execution.
const SECRET_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Failed to execute secret command: {0}")]
    Spawn(String),

    #[error("Secret command failed with status {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Secret command timed out")]
    Timeout,

    #[error("Secret command returned an empty value")]
    Empty,
}

/// Source of a password or API key.
#[derive(Clone, Default)]
pub enum SecretSource {
    /// No secret configured.
    #[default]
    None,
    /// Static value.
    Static(String),
    /// Shell command that prints the secret (for password managers or rotating tokens).
    Command(String),
}

impl std::fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::None => write!(f, "None"),
            SecretSource::Static(_) => write!(f, "Static(<redacted>)"),
            SecretSource::Command(cmd) => write!(f, "Command({:?})", cmd),
        }
    }
}

impl SecretSource {
    /// Pick the command when present, the static value otherwise.
    pub fn from_parts(value: Option<String>, command: Option<String>) -> Self {
        match (command, value) {
            (Some(cmd), _) => SecretSource::Command(cmd),
            (None, Some(value)) => SecretSource::Static(value),
            (None, None) => SecretSource::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SecretSource::None)
    }

    /// Get the current secret, executing the command if necessary.
    pub async fn resolve(&self) -> Result<Option<String>, SecretError> {
        match self {
            SecretSource::None => Ok(None),
            SecretSource::Static(value) => Ok(Some(value.clone())),
            SecretSource::Command(cmd) => {
                debug!(command = %cmd, "Fetching secret via command");

                let result = tokio::time::timeout(
                    SECRET_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "Secret command failed to execute");
                        return Err(SecretError::Spawn(e.to_string()));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "Secret command timed out");
                        return Err(SecretError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                    warn!(command = %cmd, stderr = %stderr, "Secret command failed");
                    return Err(SecretError::Failed {
                        status: output.status.to_string(),
                        stderr,
                    });
                }

                let secret = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if secret.is_empty() {
                    return Err(SecretError::Empty);
                }
                Ok(Some(secret))
            }
        }
    }
}
