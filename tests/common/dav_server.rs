//! In-process WebDAV-like file server
//!
//! Serves a single file at [`CATALOG_PATH`] with basic auth, GET, PUT, ETag
//! and `If-Match` preconditions, which is all the catalog store relies on.

use super::constants::*;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use base64::Engine;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Default)]
struct DavState {
    contents: Option<Vec<u8>>,
    version: u64,
    puts: usize,
    /// When set, every request gets this status.
    forced_status: Option<StatusCode>,
}

type SharedDav = Arc<Mutex<DavState>>;

fn etag(version: u64) -> String {
    format!("\"{}\"", version)
}

fn is_authorized(headers: &HeaderMap) -> bool {
    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", DAV_USER, DAV_PASS))
    );
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
}

async fn get_file(State(state): State<SharedDav>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if let Some(status) = state.forced_status {
        return status.into_response();
    }
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match &state.contents {
        Some(bytes) => (
            StatusCode::OK,
            [(header::ETAG, etag(state.version))],
            bytes.clone(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_file(State(state): State<SharedDav>, headers: HeaderMap, body: Bytes) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(status) = state.forced_status {
        return status.into_response();
    }
    if !is_authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    if let Some(if_match) = headers.get(header::IF_MATCH).and_then(|v| v.to_str().ok()) {
        if state.contents.is_none() || if_match != etag(state.version) {
            return StatusCode::PRECONDITION_FAILED.into_response();
        }
    }

    let created = state.contents.is_none();
    state.contents = Some(body.to_vec());
    state.version += 1;
    state.puts += 1;

    if created {
        StatusCode::CREATED.into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Test share instance
///
/// When dropped, the server shuts down.
pub struct DavServer {
    /// Base URL (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: SharedDav,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl DavServer {
    /// Spawns an empty share (the catalog file does not exist).
    pub async fn spawn() -> Self {
        Self::spawn_with(None).await
    }

    /// Spawns a share whose catalog file holds `contents`.
    pub async fn spawn_with_catalog(contents: &str) -> Self {
        Self::spawn_with(Some(contents.as_bytes().to_vec())).await
    }

    async fn spawn_with(contents: Option<Vec<u8>>) -> Self {
        let state: SharedDav = Arc::new(Mutex::new(DavState {
            version: u64::from(contents.is_some()),
            contents,
            ..Default::default()
        }));

        let app = Router::new()
            .route(CATALOG_PATH, get(get_file).put(put_file))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url, CATALOG_PATH)
    }

    pub fn contents(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .contents
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Replace the file as another client would.
    pub fn overwrite(&self, contents: &str) {
        let mut state = self.state.lock().unwrap();
        state.contents = Some(contents.as_bytes().to_vec());
        state.version += 1;
    }

    /// Number of successful PUTs.
    pub fn puts(&self) -> usize {
        self.state.lock().unwrap().puts
    }

    /// Answer every request with `status` (e.g. a misbehaving NAS).
    pub fn force_status(&self, status: StatusCode) {
        self.state.lock().unwrap().forced_status = Some(status);
    }
}

impl Drop for DavServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
