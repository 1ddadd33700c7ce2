// ABOUTME: Task executor contract and execution result types
// ABOUTME: Defines the interface every task implementation satisfies and its outcome shape

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::context::ExecutionContext;

/// Outcome status of a single task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Failed,
}

/// The outcome of a task execution.
///
/// On success, `output` may be any JSON value (including null) and is
/// published to the execution context by the runner. On failure, `error`
/// carries a human-readable message and `output` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub status: TaskStatus,
    pub output: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(output: Value) -> Self {
        Self {
            status: TaskStatus::Success,
            output,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            output: Value::Null,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// Contract for all task implementations.
///
/// Executors receive the current execution context and the task's config
/// map from the workflow definition. They may read and write the context;
/// writes are visible to later tasks. Unexpected conditions must be
/// converted into a failed [`TaskResult`] rather than raised — the runner
/// installs no panic barriers.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run the task against the given context and configuration.
    async fn execute(&self, context: &ExecutionContext, config: &Map<String, Value>) -> TaskResult;

    /// The task type string this executor is registered under.
    fn task_type(&self) -> &'static str;
}

/// Configurable test double for exercising the runner without real executors.
///
/// Returns the configured output on success or the configured message as a
/// failure. Intended for tests only.
pub struct MockExecutor {
    pub should_fail: bool,
    pub output: Value,
    pub error_message: String,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self {
            should_fail: false,
            output: serde_json::json!({"mock": "result"}),
            error_message: "mock failure".to_string(),
        }
    }
}

#[async_trait]
impl TaskExecutor for MockExecutor {
    async fn execute(&self, _context: &ExecutionContext, _config: &Map<String, Value>) -> TaskResult {
        if self.should_fail {
            TaskResult::failure(self.error_message.clone())
        } else {
            TaskResult::success(self.output.clone())
        }
    }

    fn task_type(&self) -> &'static str {
        "mock"
    }
}
