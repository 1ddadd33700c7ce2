// ABOUTME: Data model for workflow definitions and persisted entities
// ABOUTME: Defines workflows, executions, task logs, and their status enums

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A complete workflow definition: a name and an ordered list of tasks.
///
/// This is the decoded form of the JSON `definition` document stored on a
/// [`Workflow`]. Task ids are expected to be unique within a workflow; the
/// engine does not enforce this, and a duplicated id overwrites the earlier
/// task's result key in the execution context (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

/// A single executable task within a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
}

/// Error raised when a persisted status string does not match a known variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct ParseStatusError(String);

/// Lifecycle status of an execution: `pending → running → (completed | failed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
        }
    }

    /// Terminal executions are immutable.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ExecutionStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(ExecutionStatus::Pending),
            "running" => Ok(ExecutionStatus::Running),
            "completed" => Ok(ExecutionStatus::Completed),
            "failed" => Ok(ExecutionStatus::Failed),
            _ => Err(ParseStatusError(value)),
        }
    }
}

/// Status of one task attempt within an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLogStatus {
    Running,
    Success,
    Failed,
}

impl TaskLogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskLogStatus::Running => "running",
            TaskLogStatus::Success => "success",
            TaskLogStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskLogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TaskLogStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "running" => Ok(TaskLogStatus::Running),
            "success" => Ok(TaskLogStatus::Success),
            "failed" => Ok(TaskLogStatus::Failed),
            _ => Err(ParseStatusError(value)),
        }
    }
}

/// A persisted workflow: a unique name plus its JSON definition document.
///
/// Workflows are created and mutated only by clients; the engine never
/// writes to this entity.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub definition: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, definition: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            definition,
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode the stored definition document into its typed form.
    pub fn decode_definition(&self) -> Result<WorkflowDefinition, serde_json::Error> {
        serde_json::from_value(self.definition.clone())
    }
}

/// One attempt to run a workflow end-to-end.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Execution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ExecutionStatus,
    pub context_snapshot: Option<Value>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Execution {
    /// Create a pending execution for the given workflow.
    pub fn new(workflow_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workflow_id,
            status: ExecutionStatus::Pending,
            context_snapshot: None,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The audit record of one task's attempt within one execution.
///
/// `input` holds the task's config as written in the workflow definition;
/// `output` is present iff the task succeeded, `error` iff it failed.
/// `completed_at` is unset while the task is still running.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskLog {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub task_id: String,
    pub task_type: String,
    #[sqlx(try_from = "String")]
    pub status: TaskLogStatus,
    pub input: Option<Value>,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TaskLog {
    /// Create a running task log stamped with the current time.
    pub fn begin(execution_id: Uuid, task_id: impl Into<String>, task_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            execution_id,
            task_id: task_id.into(),
            task_type: task_type.into(),
            status: TaskLogStatus::Running,
            input: None,
            output: None,
            error: None,
            started_at: now,
            completed_at: None,
            created_at: now,
        }
    }
}
