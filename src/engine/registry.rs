// ABOUTME: Task registry mapping task type names to executor implementations
// ABOUTME: Provides thread-safe registration and lookup of task executors

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::error::{EngineError, Result};
use super::executor::TaskExecutor;

/// Maps a task-type string to exactly one executor.
///
/// Registration is expected at process start; later registrations are
/// permitted and become visible to subsequent lookups. Registering an
/// executor whose type is already present overwrites the earlier entry.
#[derive(Default)]
pub struct TaskRegistry {
    executors: RwLock<HashMap<String, Arc<dyn TaskExecutor>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            executors: RwLock::new(HashMap::new()),
        }
    }

    /// Register an executor under its own task type, overwriting any
    /// previous registration for that type.
    pub fn register(&self, executor: Arc<dyn TaskExecutor>) {
        let task_type = executor.task_type().to_string();
        let mut executors = self.executors.write().expect("registry lock poisoned");
        executors.insert(task_type, executor);
    }

    /// Look up the executor for a task type.
    pub fn lookup(&self, task_type: &str) -> Result<Arc<dyn TaskExecutor>> {
        let executors = self.executors.read().expect("registry lock poisoned");
        executors
            .get(task_type)
            .cloned()
            .ok_or_else(|| EngineError::ExecutorNotFound {
                task_type: task_type.to_string(),
            })
    }

    /// Snapshot of all registered task types, order unspecified.
    pub fn list(&self) -> Vec<String> {
        let executors = self.executors.read().expect("registry lock poisoned");
        executors.keys().cloned().collect()
    }
}

impl std::fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("task_types", &self.list())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::executor::MockExecutor;

    #[test]
    fn test_register_and_lookup() {
        let registry = TaskRegistry::new();
        registry.register(Arc::new(MockExecutor::default()));

        assert!(registry.lookup("mock").is_ok());
        assert_eq!(registry.list(), vec!["mock".to_string()]);
    }

    #[test]
    fn test_lookup_unregistered_type() {
        let registry = TaskRegistry::new();

        let err = match registry.lookup("nonesuch") {
            Err(e) => e,
            Ok(_) => panic!("expected lookup of \"nonesuch\" to fail"),
        };
        assert!(matches!(
            err,
            EngineError::ExecutorNotFound { ref task_type } if task_type == "nonesuch"
        ));
        assert!(err.to_string().contains("nonesuch"));
    }

    #[test]
    fn test_register_overwrites_existing() {
        let registry = TaskRegistry::new();
        registry.register(Arc::new(MockExecutor::default()));
        registry.register(Arc::new(MockExecutor {
            should_fail: true,
            ..Default::default()
        }));

        // Still exactly one entry for the type.
        assert_eq!(registry.list().len(), 1);
    }
}
