//! BlobStore trait definition.
//!
//! The whole catalog lives in one remote resource. A store only knows how to
//! read it and overwrite it.

use async_trait::async_trait;
use thiserror::Error;

/// Raw contents of the remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    /// Version tag reported by the server, if it reports one.
    pub etag: Option<String>,
}

/// Condition the remote must satisfy for a write to be applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WritePrecondition {
    /// Unconditional overwrite, last write wins.
    #[default]
    None,
    /// Only overwrite if the resource still has this etag.
    IfMatch(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The resource does not exist or has an empty body.
    #[error("Remote catalog not found")]
    NotFound,

    /// Network, authentication or protocol failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A write precondition did not hold: somebody else wrote in between.
    #[error("Remote catalog changed concurrently: {0}")]
    Conflict(String),
}

impl StoreError {
    /// Failures that leave the remote state unknown to the caller.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Transport(_) | StoreError::Conflict(_))
    }
}

/// Trait for catalog storage backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Human readable location of the resource, for logs and the `where` command.
    fn location(&self) -> &str;

    /// Read the resource.
    async fn fetch(&self) -> Result<Blob, StoreError>;

    /// Overwrite the resource with `bytes`.
    ///
    /// No retries are performed.
    async fn store(&self, bytes: Vec<u8>, precondition: WritePrecondition)
        -> Result<(), StoreError>;
}
