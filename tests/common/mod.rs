// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides in-memory app state, mock HTTP servers, and failing stores

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use tokio::sync::Mutex;
use uuid::Uuid;

use conductor::api::AppState;
use conductor::model::TaskLog;
use conductor::store::memory::{
    InMemoryExecutionStore, InMemoryTaskLogStore, InMemoryWorkflowStore,
};
use conductor::store::{Result as StoreResult, StoreError, TaskLogStore};
use conductor::tasks;

/// Application state backed by in-memory stores and the built-in executors.
pub fn in_memory_state() -> AppState {
    AppState {
        workflows: Arc::new(InMemoryWorkflowStore::new()),
        executions: Arc::new(InMemoryExecutionStore::new()),
        task_logs: Arc::new(InMemoryTaskLogStore::new()),
        registry: Arc::new(tasks::builtin_registry()),
        pool: None,
    }
}

/// Bind the given router on an ephemeral local port and serve it in the
/// background. Returns the bound address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// HTML document served by the mock listing site: three listings with
/// titles, prices, and detail links.
pub const LISTINGS_HTML: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <div class="listing">
      <h2 class="listing-title">Beach House</h2>
      <span class="price-amount">$350</span>
      <a class="listing-link" href="/rooms/1">view</a>
    </div>
    <div class="listing">
      <h2 class="listing-title">Mountain Cabin</h2>
      <span class="price-amount">$275</span>
      <a class="listing-link" href="/rooms/2">view</a>
    </div>
    <div class="listing">
      <h2 class="listing-title">City Loft</h2>
      <span class="price-amount">$450</span>
      <a class="listing-link" href="/rooms/3">view</a>
    </div>
  </body>
</html>"#;

/// Serve the listing HTML on an ephemeral port.
pub async fn spawn_listings_server() -> SocketAddr {
    let router = Router::new().route(
        "/",
        axum::routing::get(|| async {
            (
                [("Content-Type", "text/html; charset=utf-8")],
                LISTINGS_HTML,
            )
        }),
    );
    spawn_server(router).await
}

/// One request observed by the echo server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub content_type: String,
    pub body: String,
}

/// Records incoming requests and echoes the `u` field back as JSON.
#[derive(Clone, Default)]
pub struct EchoState {
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Serve an echo endpoint that captures each raw request (content type and
/// body) and responds with `{"received": <body.u>}`.
pub async fn spawn_echo_server(state: EchoState) -> SocketAddr {
    let router = Router::new()
        .route(
            "/",
            axum::routing::post(
                |axum::extract::State(state): axum::extract::State<EchoState>,
                 headers: axum::http::HeaderMap,
                 body: String| async move {
                    let content_type = headers
                        .get("content-type")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    state
                        .requests
                        .lock()
                        .await
                        .push(RecordedRequest { content_type, body: body.clone() });
                    let parsed: serde_json::Value =
                        serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
                    axum::Json(serde_json::json!({"received": parsed["u"]}))
                },
            ),
        )
        .with_state(state);
    spawn_server(router).await
}

/// Task-log store that fails every call, for exercising best-effort audit
/// logging.
pub struct FailingTaskLogStore;

#[async_trait]
impl TaskLogStore for FailingTaskLogStore {
    async fn create(&self, _log: &TaskLog) -> StoreResult<()> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn update(&self, _log: &TaskLog) -> StoreResult<()> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn list_by_execution(&self, _execution_id: Uuid) -> StoreResult<Vec<TaskLog>> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}
