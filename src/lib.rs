// ABOUTME: Main library module for the conductor workflow orchestrator
// ABOUTME: Exports all core modules and provides the public API

pub mod api;
pub mod config;
pub mod engine;
pub mod model;
pub mod store;
pub mod tasks;
pub mod template;

// Re-export commonly used types
pub use engine::{
    EngineError, ExecutionContext, TaskExecutor, TaskRegistry, TaskResult, TaskStatus,
    WorkflowEngine,
};
pub use model::{
    Execution, ExecutionStatus, TaskLog, TaskLogStatus, TaskSpec, Workflow, WorkflowDefinition,
};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
