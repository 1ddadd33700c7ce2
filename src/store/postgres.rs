// ABOUTME: PostgreSQL store implementations using sqlx
// ABOUTME: Persists workflows, executions, and task logs in JSONB-backed tables

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::{Execution, TaskLog, Workflow};

use super::{ExecutionStore, Result, StoreError, TaskLogStore, WorkflowStore};

/// Column list for `workflows` queries.
const WORKFLOW_COLUMNS: &str = "id, name, definition, created_at, updated_at";

/// Column list for `executions` queries.
const EXECUTION_COLUMNS: &str =
    "id, workflow_id, status, context_snapshot, started_at, completed_at, created_at, updated_at";

/// Column list for `task_logs` queries.
const TASK_LOG_COLUMNS: &str = "id, execution_id, task_id, task_type, status, input, output, \
                                error, started_at, completed_at, created_at";

/// Map a unique-constraint violation on the workflow name to a duplicate
/// error; everything else passes through as a database error.
fn classify_workflow_error(err: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return StoreError::DuplicateName {
                name: name.to_string(),
            };
        }
    }
    StoreError::Database(err)
}

pub struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn create(&self, workflow: &Workflow) -> Result<()> {
        sqlx::query(
            "INSERT INTO workflows (id, name, definition, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(workflow.id)
        .bind(&workflow.name)
        .bind(&workflow.definition)
        .bind(workflow.created_at)
        .bind(workflow.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| classify_workflow_error(err, &workflow.name))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Workflow> {
        let query = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "workflow",
                id,
            })
    }

    async fn get_by_name(&self, name: &str) -> Result<Workflow> {
        let query = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE name = $1");
        sqlx::query_as::<_, Workflow>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "workflow",
                id: Uuid::nil(),
            })
    }

    async fn list_all(&self) -> Result<Vec<Workflow>> {
        let query = format!("SELECT {WORKFLOW_COLUMNS} FROM workflows ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Workflow>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update(&self, workflow: &Workflow) -> Result<()> {
        let result = sqlx::query(
            "UPDATE workflows SET name = $2, definition = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(workflow.id)
        .bind(&workflow.name)
        .bind(&workflow.definition)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| classify_workflow_error(err, &workflow.name))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "workflow",
                id: workflow.id,
            });
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "workflow",
                id,
            });
        }
        Ok(())
    }
}

pub struct PgExecutionStore {
    pool: PgPool,
}

impl PgExecutionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExecutionStore for PgExecutionStore {
    async fn create(&self, execution: &Execution) -> Result<()> {
        sqlx::query(
            "INSERT INTO executions \
             (id, workflow_id, status, context_snapshot, started_at, completed_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(execution.id)
        .bind(execution.workflow_id)
        .bind(execution.status.as_str())
        .bind(&execution.context_snapshot)
        .bind(execution.started_at)
        .bind(execution.completed_at)
        .bind(execution.created_at)
        .bind(execution.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, execution: &Execution) -> Result<()> {
        let result = sqlx::query(
            "UPDATE executions SET status = $2, context_snapshot = $3, started_at = $4, \
             completed_at = $5, updated_at = $6 WHERE id = $1",
        )
        .bind(execution.id)
        .bind(execution.status.as_str())
        .bind(&execution.context_snapshot)
        .bind(execution.started_at)
        .bind(execution.completed_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "execution",
                id: execution.id,
            });
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Execution> {
        let query = format!("SELECT {EXECUTION_COLUMNS} FROM executions WHERE id = $1");
        sqlx::query_as::<_, Execution>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "execution",
                id,
            })
    }

    async fn list_by_workflow(&self, workflow_id: Uuid) -> Result<Vec<Execution>> {
        let query = format!(
            "SELECT {EXECUTION_COLUMNS} FROM executions \
             WHERE workflow_id = $1 ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Execution>(&query)
            .bind(workflow_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_all(&self) -> Result<Vec<Execution>> {
        let query = format!("SELECT {EXECUTION_COLUMNS} FROM executions ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Execution>(&query)
            .fetch_all(&self.pool)
            .await?)
    }
}

pub struct PgTaskLogStore {
    pool: PgPool,
}

impl PgTaskLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskLogStore for PgTaskLogStore {
    async fn create(&self, log: &TaskLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO task_logs \
             (id, execution_id, task_id, task_type, status, input, output, error, \
              started_at, completed_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(log.id)
        .bind(log.execution_id)
        .bind(&log.task_id)
        .bind(&log.task_type)
        .bind(log.status.as_str())
        .bind(&log.input)
        .bind(&log.output)
        .bind(&log.error)
        .bind(log.started_at)
        .bind(log.completed_at)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, log: &TaskLog) -> Result<()> {
        let result = sqlx::query(
            "UPDATE task_logs SET status = $2, input = $3, output = $4, error = $5, \
             completed_at = $6 WHERE id = $1",
        )
        .bind(log.id)
        .bind(log.status.as_str())
        .bind(&log.input)
        .bind(&log.output)
        .bind(&log.error)
        .bind(log.completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "task log",
                id: log.id,
            });
        }
        Ok(())
    }

    async fn list_by_execution(&self, execution_id: Uuid) -> Result<Vec<TaskLog>> {
        let query = format!(
            "SELECT {TASK_LOG_COLUMNS} FROM task_logs \
             WHERE execution_id = $1 ORDER BY started_at ASC"
        );
        Ok(sqlx::query_as::<_, TaskLog>(&query)
            .bind(execution_id)
            .fetch_all(&self.pool)
            .await?)
    }
}
