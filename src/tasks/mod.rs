// ABOUTME: Built-in task executor implementations
// ABOUTME: Contains the HTTP request, HTML parser, and transform executors

pub mod html;
pub mod http;
pub mod transform;

use std::sync::Arc;

use tracing::info;

use crate::engine::TaskRegistry;

pub use html::HtmlParserTask;
pub use http::HttpRequestTask;
pub use transform::TransformTask;

/// Build a registry with all built-in task executors registered.
pub fn builtin_registry() -> TaskRegistry {
    let registry = TaskRegistry::new();
    registry.register(Arc::new(HttpRequestTask::new()));
    registry.register(Arc::new(HtmlParserTask));
    registry.register(Arc::new(TransformTask::new()));

    info!(task_types = ?registry.list(), "registered built-in task executors");
    registry
}
