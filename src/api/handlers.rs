// ABOUTME: HTTP handlers for workflow CRUD, execution dispatch, and health
// ABOUTME: Implements the accept-and-run pattern for asynchronous workflow execution

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::engine::WorkflowEngine;
use crate::model::{Execution, TaskLog, Workflow};
use crate::store::{ExecutionStore, TaskLogStore, WorkflowStore};

use super::error::{ApiError, ApiResult};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkflowRequest {
    pub name: String,
    pub definition: Value,
}

/// Response shape for `GET /executions/{id}`: the execution record with its
/// ordered task logs embedded.
#[derive(Debug, serde::Serialize)]
pub struct ExecutionResponse {
    #[serde(flatten)]
    pub execution: Execution,
    pub task_logs: Vec<TaskLog>,
}

fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid {} id", what)))
}

/// POST /workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(req): Json<WorkflowRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("workflow name must not be empty".into()));
    }

    let workflow = Workflow::new(req.name, req.definition);
    state.workflows.create(&workflow).await?;

    info!(id = %workflow.id, name = %workflow.name, "workflow created");
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// GET /workflows/{id}
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "workflow")?;
    let workflow = state.workflows.get(id).await?;
    Ok(Json(workflow))
}

/// GET /workflows
pub async fn list_workflows(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let workflows = state.workflows.list_all().await?;
    Ok(Json(workflows))
}

/// PUT /workflows/{id}
pub async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<WorkflowRequest>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "workflow")?;
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("workflow name must not be empty".into()));
    }

    let mut workflow = state.workflows.get(id).await?;
    workflow.name = req.name;
    workflow.definition = req.definition;
    workflow.updated_at = Utc::now();

    state.workflows.update(&workflow).await?;

    info!(id = %workflow.id, "workflow updated");
    Ok(Json(workflow))
}

/// DELETE /workflows/{id}
pub async fn delete_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "workflow")?;
    state.workflows.delete(id).await?;

    info!(%id, "workflow deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /workflows/{id}/run
///
/// Creates a pending execution, schedules the logging runner on a background
/// task, and returns immediately. Clients poll `GET /executions/{id}` to
/// observe progression and final status.
pub async fn run_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let workflow_id = parse_id(&id, "workflow")?;
    let workflow = state.workflows.get(workflow_id).await?;

    let definition = workflow
        .decode_definition()
        .map_err(|e| ApiError::BadRequest(format!("invalid workflow definition: {}", e)))?;

    let execution = Execution::new(workflow_id);
    state.executions.create(&execution).await?;

    let execution_id = execution.id;
    let registry = state.registry.clone();
    let executions = state.executions.clone();
    let task_logs = state.task_logs.clone();

    tokio::spawn(async move {
        // Fresh engine per run: each execution gets its own context.
        let engine = WorkflowEngine::new(registry);
        match engine
            .execute_with_logging(
                &definition,
                workflow_id,
                Some(execution_id),
                executions.as_ref(),
                task_logs.as_ref(),
            )
            .await
        {
            Ok((_, None)) => debug!(execution_id = %execution_id, "execution completed"),
            Ok((_, Some(err))) => {
                warn!(execution_id = %execution_id, error = %err, "execution failed")
            }
            Err(err) => {
                error!(execution_id = %execution_id, error = %err, "execution aborted")
            }
        }
    });

    info!(execution_id = %execution_id, workflow_id = %workflow_id, "workflow execution started");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "execution_id": execution_id,
            "workflow_id": workflow_id,
            "status": "pending",
        })),
    ))
}

/// GET /executions/{id}
pub async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "execution")?;
    let execution = state.executions.get(id).await?;
    let task_logs = state.task_logs.list_by_execution(id).await?;

    Ok(Json(ExecutionResponse {
        execution,
        task_logs,
    }))
}

/// GET /executions
pub async fn list_executions(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let executions = state.executions.list_all().await?;
    Ok(Json(executions))
}

/// GET /health
///
/// Reports process liveness and database connectivity.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    debug!("health check requested");

    if let Some(pool) = &state.pool {
        if let Err(err) = sqlx::query("SELECT 1").execute(pool).await {
            error!(error = %err, "database health check failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "unhealthy", "database": "disconnected"})),
            );
        }
    }

    (
        StatusCode::OK,
        Json(json!({"status": "healthy", "database": "connected"})),
    )
}
