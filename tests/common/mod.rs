//! Common test infrastructure
//!
//! Spawns the remote collaborators (a WebDAV share and an OpenAI-compatible
//! endpoint) in-process, each on a random port.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{DavServer, SEED_CATALOG};
//!
//! #[tokio::test]
//! async fn test_load() {
//!     let dav = DavServer::spawn_with_catalog(SEED_CATALOG).await;
//!     let service = common::catalog_service(&dav);
//!     assert_eq!(service.load().await.unwrap().len(), 2);
//! }
//! ```

#![allow(dead_code)]

mod constants;
mod dav_server;
mod llm_server;

pub use constants::*;
pub use dav_server::DavServer;
pub use llm_server::LlmServer;

use home_library::blob_store::{WebDavBlobStore, WebDavConfig};
use home_library::catalog::CatalogSchema;
use home_library::config::SecretSource;
use home_library::llm::OpenAIProvider;
use home_library::CatalogService;
use std::sync::Arc;
use std::time::Duration;

pub fn dav_store(dav: &DavServer, password: &str) -> WebDavBlobStore {
    WebDavBlobStore::new(WebDavConfig {
        url: dav.catalog_url(),
        username: Some(DAV_USER.to_string()),
        password: SecretSource::Static(password.to_string()),
        timeout: Duration::from_secs(5),
    })
    .expect("Failed to create store")
}

/// Catalog service talking to `dav` with valid credentials.
pub fn catalog_service(dav: &DavServer) -> CatalogService {
    CatalogService::new(
        Arc::new(dav_store(dav, DAV_PASS)),
        CatalogSchema::TitleAuthorLocation,
        true,
    )
}

pub fn llm_provider(llm: &LlmServer) -> OpenAIProvider {
    OpenAIProvider::new(
        &llm.base_url,
        LLM_MODEL,
        SecretSource::Static(LLM_API_KEY.to_string()),
    )
}
