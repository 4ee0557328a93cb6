//! In-process OpenAI-compatible chat completions endpoint
//!
//! Answers every completion with a canned reply and records the request
//! bodies so tests can inspect what was sent.

use super::constants::*;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

struct LlmState {
    reply: String,
    requests: Vec<Value>,
}

type SharedLlm = Arc<Mutex<LlmState>>;

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", LLM_API_KEY))
        .unwrap_or(false)
}

async fn chat_completions(
    State(state): State<SharedLlm>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !is_authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "invalid api key" } })),
        )
            .into_response();
    }

    let mut state = state.lock().unwrap();
    state.requests.push(body);
    Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": state.reply },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 100, "completion_tokens": 20, "total_tokens": 120 }
    }))
    .into_response()
}

async fn models() -> Json<Value> {
    Json(json!({ "object": "list", "data": [{ "id": LLM_MODEL, "object": "model" }] }))
}

/// Mock LLM endpoint instance
///
/// When dropped, the server shuts down.
pub struct LlmServer {
    /// Base URL including the `/v1` prefix
    pub base_url: String,

    state: SharedLlm,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl LlmServer {
    /// Spawns an endpoint that answers every completion with `reply`.
    pub async fn spawn(reply: &str) -> Self {
        let state: SharedLlm = Arc::new(Mutex::new(LlmState {
            reply: reply.to_string(),
            requests: Vec::new(),
        }));

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .route("/v1/models", get(models))
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
            base_url: format!("http://127.0.0.1:{}/v1", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Request bodies received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.state.lock().unwrap().requests.clone()
    }
}

impl Drop for LlmServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
