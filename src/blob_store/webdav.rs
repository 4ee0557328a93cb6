//! HTTP client for a single file on a WebDAV share.
//!
//! Only plain GET and PUT are used, so any HTTP file server with basic
//! authentication works (home routers and NAS boxes included).

use super::trait_def::{Blob, BlobStore, StoreError, WritePrecondition};
use crate::config::SecretSource;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, ETAG, IF_MATCH};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct WebDavConfig {
    /// Full URL of the catalog file.
    pub url: String,
    pub username: Option<String>,
    pub password: SecretSource,
    pub timeout: Duration,
}

pub struct WebDavBlobStore {
    client: Client,
    url: String,
    username: Option<String>,
    password: SecretSource,
}

impl WebDavBlobStore {
    pub fn new(config: WebDavConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url,
            username: config.username,
            password: config.password,
        })
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        let password = self
            .password
            .resolve()
            .await
            .map_err(|e| StoreError::Transport(format!("Could not obtain password: {}", e)))?;

        Ok(match &self.username {
            Some(username) => request.basic_auth(username, password),
            None => request,
        })
    }
}

fn transport_error(method: &str, url: &str, e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Transport(format!("{} {} timed out", method, url))
    } else {
        StoreError::Transport(format!("{} {} failed: {}", method, url, e))
    }
}

#[async_trait]
impl BlobStore for WebDavBlobStore {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Blob, StoreError> {
        debug!(url = %self.url, "Fetching catalog");

        let request = self.authorize(self.client.get(&self.url)).await?;
        let response = request
            .send()
            .await
            .map_err(|e| transport_error("GET", &self.url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            info!(url = %self.url, "Catalog file does not exist yet");
            return Err(StoreError::NotFound);
        }
        if !status.is_success() {
            return Err(StoreError::Transport(format!(
                "GET {} failed with status {}",
                self.url, status
            )));
        }

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("GET", &self.url, e))?;

        if bytes.is_empty() {
            info!(url = %self.url, "Catalog file is empty");
            return Err(StoreError::NotFound);
        }

        debug!(url = %self.url, size = bytes.len(), etag = ?etag, "Fetched catalog");
        Ok(Blob {
            bytes: bytes.to_vec(),
            etag,
        })
    }

    async fn store(
        &self,
        bytes: Vec<u8>,
        precondition: WritePrecondition,
    ) -> Result<(), StoreError> {
        let size = bytes.len();
        let mut request = self
            .client
            .put(&self.url)
            .header(CONTENT_TYPE, "text/csv; charset=utf-8")
            .body(bytes);

        request = match &precondition {
            WritePrecondition::None => request,
            WritePrecondition::IfMatch(etag) => request.header(IF_MATCH, etag.as_str()),
        };

        let request = self.authorize(request).await?;
        let response = request
            .send()
            .await
            .map_err(|e| transport_error("PUT", &self.url, e))?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
                info!(url = %self.url, size, "Stored catalog");
                Ok(())
            }
            StatusCode::PRECONDITION_FAILED => Err(StoreError::Conflict(format!(
                "PUT {} rejected, precondition {:?} no longer holds",
                self.url, precondition
            ))),
            status => Err(StoreError::Transport(format!(
                "PUT {} failed with status {}",
                self.url, status
            ))),
        }
    }
}
