// ABOUTME: Workflow engine running tasks sequentially through registered executors
// ABOUTME: Provides the plain runner and the audit-logging runner with durable records

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::model::{Execution, ExecutionStatus, TaskLog, TaskLogStatus, WorkflowDefinition};
use crate::store::{ExecutionStore, StoreError, TaskLogStore};

use super::context::ExecutionContext;
use super::error::{EngineError, Result};
use super::registry::TaskRegistry;

/// Orchestrates workflow execution with strictly sequential task processing.
///
/// Each engine owns its own [`ExecutionContext`]; concurrent executions use
/// separate engine instances. Task N+1 starts only after task N has produced
/// its result and the result key has been published to the context.
pub struct WorkflowEngine {
    registry: Arc<TaskRegistry>,
    context: ExecutionContext,
}

impl WorkflowEngine {
    pub fn new(registry: Arc<TaskRegistry>) -> Self {
        Self {
            registry,
            context: ExecutionContext::new(),
        }
    }

    /// The engine's execution context, for pre-populating data or
    /// inspecting results after a run.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Run a workflow without any persistence.
    ///
    /// Walks the tasks in order: looks up each executor, invokes it with the
    /// shared context, publishes `{task_id}_result` on success, and halts on
    /// the first failure. Useful as an in-process or test harness; the
    /// durable path is [`execute_with_logging`](Self::execute_with_logging).
    pub async fn execute(&self, definition: &WorkflowDefinition) -> Result<()> {
        info!(workflow = %definition.name, "starting workflow execution");

        for (index, task) in definition.tasks.iter().enumerate() {
            info!(index, id = %task.id, task_type = %task.task_type, "processing task");

            let executor = self.registry.lookup(&task.task_type)?;
            let result = executor.execute(&self.context, &task.config).await;

            if result.is_success() {
                self.context
                    .set(format!("{}_result", task.id), result.output)
                    .await;
            } else {
                let message = result
                    .error
                    .unwrap_or_else(|| "task returned no error message".to_string());
                error!(id = %task.id, error = %message, "task failed, halting workflow");
                return Err(EngineError::TaskFailed {
                    task_id: task.id.clone(),
                    message,
                });
            }
        }

        info!(workflow = %definition.name, "workflow execution completed");
        Ok(())
    }

    /// Run a workflow with a durable execution record and per-task audit logs.
    ///
    /// If `execution_id` is supplied, the pre-created record is moved to
    /// `running` (falling back to a create if the row is missing); otherwise
    /// a fresh record is minted. Store failures on the execution record abort
    /// the run; task-log store failures are logged and swallowed so that the
    /// audit trail stays best-effort. On completion the context snapshot is
    /// stored and the execution transitions to `completed` or `failed`
    /// exactly once.
    ///
    /// Returns the final execution record together with the execution-level
    /// error, if any task failed or could not be dispatched.
    pub async fn execute_with_logging(
        &self,
        definition: &WorkflowDefinition,
        workflow_id: Uuid,
        execution_id: Option<Uuid>,
        executions: &dyn ExecutionStore,
        task_logs: &dyn TaskLogStore,
    ) -> Result<(Execution, Option<EngineError>)> {
        self.context.clear().await;

        let mut execution = self
            .materialize_execution(workflow_id, execution_id, executions)
            .await?;

        info!(
            workflow = %definition.name,
            execution_id = %execution.id,
            task_count = definition.tasks.len(),
            "starting logged workflow execution"
        );

        let mut failure: Option<EngineError> = None;

        for task in &definition.tasks {
            let mut log = TaskLog::begin(execution.id, &task.id, &task.task_type);
            log.input = Some(Value::Object(task.config.clone()));

            if let Err(err) = task_logs.create(&log).await {
                warn!(task_id = %task.id, error = %err, "failed to create task log, continuing");
            }

            let executor = match self.registry.lookup(&task.task_type) {
                Ok(executor) => executor,
                Err(err) => {
                    log.status = TaskLogStatus::Failed;
                    log.error = Some(format!(
                        "executor not found for type '{}': {}",
                        task.task_type, err
                    ));
                    log.completed_at = Some(Utc::now());
                    if let Err(store_err) = task_logs.update(&log).await {
                        warn!(task_id = %task.id, error = %store_err, "failed to update task log, continuing");
                    }
                    error!(id = %task.id, task_type = %task.task_type, "no executor registered, halting workflow");
                    failure = Some(err);
                    break;
                }
            };

            let result = executor.execute(&self.context, &task.config).await;
            log.completed_at = Some(Utc::now());

            if result.is_success() {
                self.context
                    .set(format!("{}_result", task.id), result.output.clone())
                    .await;
                log.output = Some(result.output);
                log.status = TaskLogStatus::Success;
                info!(id = %task.id, "task completed successfully");
            } else {
                let message = result
                    .error
                    .unwrap_or_else(|| "task returned no error message".to_string());
                log.error = Some(message.clone());
                log.status = TaskLogStatus::Failed;
                error!(id = %task.id, error = %message, "task failed, halting workflow");
                failure = Some(EngineError::TaskFailed {
                    task_id: task.id.clone(),
                    message,
                });
            }

            if let Err(store_err) = task_logs.update(&log).await {
                warn!(task_id = %task.id, error = %store_err, "failed to update task log, continuing");
            }

            if failure.is_some() {
                break;
            }
        }

        execution.context_snapshot = Some(self.context.to_json().await);
        execution.completed_at = Some(Utc::now());
        execution.status = if failure.is_none() {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        executions.update(&execution).await?;

        info!(
            execution_id = %execution.id,
            status = %execution.status,
            "workflow execution finished"
        );

        Ok((execution, failure))
    }

    /// Create or refresh the execution record for this run.
    ///
    /// A supplied id reconciles the accept-and-run dispatch pattern: the row
    /// was created as `pending` before the background task started, so we
    /// move it to `running` and refresh `started_at`. If the row has gone
    /// missing, a create recovers it.
    async fn materialize_execution(
        &self,
        workflow_id: Uuid,
        execution_id: Option<Uuid>,
        executions: &dyn ExecutionStore,
    ) -> Result<Execution> {
        let mut execution = Execution::new(workflow_id);
        execution.status = ExecutionStatus::Running;
        execution.started_at = Utc::now();

        match execution_id {
            Some(id) => {
                execution.id = id;
                match executions.update(&execution).await {
                    Ok(()) => {}
                    Err(StoreError::NotFound { .. }) => {
                        warn!(execution_id = %id, "execution record missing on update, creating");
                        executions.create(&execution).await?;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            None => {
                executions.create(&execution).await?;
            }
        }

        Ok(execution)
    }
}
