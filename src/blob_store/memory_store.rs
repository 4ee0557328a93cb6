//! In-memory blob store.
//!
//! Behaves like a well-behaved WebDAV server (etags, preconditions) and can be
//! switched offline to simulate transport failures.

use super::trait_def::{Blob, BlobStore, StoreError, WritePrecondition};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MemoryState {
    contents: Option<Vec<u8>>,
    version: u64,
    offline: bool,
    writes: usize,
}

#[derive(Default)]
pub struct MemoryBlobStore {
    state: Mutex<MemoryState>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            state.contents = Some(bytes.into());
            state.version = 1;
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.lock().contents.clone()
    }

    /// Replace the contents as another writer would, bumping the version.
    pub fn overwrite(&self, bytes: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        state.contents = Some(bytes.into());
        state.version += 1;
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }
}

fn etag_for(version: u64) -> String {
    format!("\"v{}\"", version)
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn location(&self) -> &str {
        "memory"
    }

    async fn fetch(&self) -> Result<Blob, StoreError> {
        let state = self.lock();
        if state.offline {
            return Err(StoreError::Transport("memory store is offline".to_string()));
        }
        match &state.contents {
            Some(bytes) if !bytes.is_empty() => Ok(Blob {
                bytes: bytes.clone(),
                etag: Some(etag_for(state.version)),
            }),
            _ => Err(StoreError::NotFound),
        }
    }

    async fn store(
        &self,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.offline {
            return Err(StoreError::Transport("memory store is offline".to_string()));
        }

        let holds = match &precondition {
            WritePrecondition::None => true,
            WritePrecondition::IfMatch(etag) => {
                state.contents.is_some() && *etag == etag_for(state.version)
            }
        };
        if !holds {
            return Err(StoreError::Conflict(format!(
                "precondition {:?} failed",
                precondition
            )));
        }

        state.contents = Some(bytes);
        state.version += 1;
        state.writes += 1;
        Ok(())
    }
}
