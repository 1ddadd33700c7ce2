// ABOUTME: Execution context for sharing data between tasks in a workflow run
// ABOUTME: Provides a thread-safe key/value map with snapshotting support

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Shared key/value storage scoped to a single workflow execution.
///
/// Tasks read data produced by earlier tasks and publish their own output
/// through this map. The handle is cheap to clone; all clones refer to the
/// same underlying state. Operations are safe under concurrent callers even
/// though the runner issues them sequentially, because snapshots may be
/// taken by observers while a task is writing.
///
/// By convention the runner publishes the output of a successful task `T`
/// under the key `T_result`; executors may set arbitrary keys of their own.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store or overwrite a value under the given key.
    pub async fn set(&self, key: impl Into<String>, value: Value) {
        let mut data = self.data.write().await;
        data.insert(key.into(), value);
    }

    /// Retrieve a value by key, if present.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let data = self.data.read().await;
        data.get(key).cloned()
    }

    /// Return a copy of all key/value pairs, safe for external reads.
    ///
    /// The outer map is a fresh allocation; values are cloned and treated
    /// as immutable from that point on.
    pub async fn snapshot(&self) -> HashMap<String, Value> {
        let data = self.data.read().await;
        data.clone()
    }

    /// Remove all key/value pairs.
    pub async fn clear(&self) {
        let mut data = self.data.write().await;
        data.clear();
    }

    /// Render the current contents as a JSON object.
    pub async fn to_json(&self) -> Value {
        let snapshot = self.snapshot().await;
        Value::Object(snapshot.into_iter().collect())
    }
}
