// ABOUTME: HTTP API module exposing the workflow and execution endpoints
// ABOUTME: Defines shared application state and the axum router

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::engine::TaskRegistry;
use crate::store::{ExecutionStore, TaskLogStore, WorkflowStore};

pub use error::{ApiError, ApiResult};

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable; stores and the registry sit behind `Arc`. The pool is
/// optional so the API can run against in-memory stores (tests, embeddings)
/// without a database.
#[derive(Clone)]
pub struct AppState {
    pub workflows: Arc<dyn WorkflowStore>,
    pub executions: Arc<dyn ExecutionStore>,
    pub task_logs: Arc<dyn TaskLogStore>,
    pub registry: Arc<TaskRegistry>,
    pub pool: Option<PgPool>,
}

/// Build the full API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/workflows",
            post(handlers::create_workflow).get(handlers::list_workflows),
        )
        .route(
            "/workflows/:id",
            get(handlers::get_workflow)
                .put(handlers::update_workflow)
                .delete(handlers::delete_workflow),
        )
        .route("/workflows/:id/run", post(handlers::run_workflow))
        .route("/executions", get(handlers::list_executions))
        .route("/executions/:id", get(handlers::get_execution))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
