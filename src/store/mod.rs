// ABOUTME: Persistence ports for workflows, executions, and task logs
// ABOUTME: Defines the narrow store traits and the shared store error type

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Execution, TaskLog, Workflow};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("workflow with name '{name}' already exists")]
    DuplicateName { name: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Store for workflow definitions, consumed by the API layer.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn create(&self, workflow: &Workflow) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Workflow>;
    async fn get_by_name(&self, name: &str) -> Result<Workflow>;
    async fn list_all(&self) -> Result<Vec<Workflow>>;
    async fn update(&self, workflow: &Workflow) -> Result<()>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Store for execution records, consumed by the engine and the API layer.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    async fn create(&self, execution: &Execution) -> Result<()>;
    async fn update(&self, execution: &Execution) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Execution>;
    async fn list_by_workflow(&self, workflow_id: Uuid) -> Result<Vec<Execution>>;
    async fn list_all(&self) -> Result<Vec<Execution>>;
}

/// Store for per-task audit records.
///
/// `list_by_execution` returns logs sorted by `started_at` ascending, which
/// reflects the linear execution order within one run.
#[async_trait]
pub trait TaskLogStore: Send + Sync {
    async fn create(&self, log: &TaskLog) -> Result<()>;
    async fn update(&self, log: &TaskLog) -> Result<()>;
    async fn list_by_execution(&self, execution_id: Uuid) -> Result<Vec<TaskLog>>;
}
