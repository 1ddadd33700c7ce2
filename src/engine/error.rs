// ABOUTME: Error types for workflow engine operations
// ABOUTME: Defines specific error types for task lookup, execution, and persistence

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("no executor registered for task type '{task_type}'")]
    ExecutorNotFound { task_type: String },

    #[error("task '{task_id}' failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("persistence error: {0}")]
    Persistence(#[from] crate::store::StoreError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
