// ABOUTME: Transform task executor reshaping context data through templates
// ABOUTME: Renders a template against context data and emits JSON or string output

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::engine::{ExecutionContext, TaskExecutor, TaskResult};
use crate::template::TemplateEngine;

/// Reshapes data from the execution context using a template.
///
/// Config fields:
///   - `template` (string, required)
///   - `data_source` (string, optional): context key whose value becomes the
///     template root; an absent key renders against an empty map rather than
///     failing. When omitted, the root is the full context snapshot.
///   - `output_format` (string, optional, default `json`): `json` attempts a
///     JSON decode of the rendered text and falls back to the raw string on
///     decode failure (still a success); `string` keeps the text verbatim.
pub struct TransformTask {
    template: TemplateEngine,
}

impl TransformTask {
    pub fn new() -> Self {
        Self {
            template: TemplateEngine::new(),
        }
    }
}

impl Default for TransformTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor for TransformTask {
    async fn execute(&self, context: &ExecutionContext, config: &Map<String, Value>) -> TaskResult {
        let template = config
            .get("template")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if template.is_empty() {
            return TaskResult::failure("missing or invalid 'template' in configuration");
        }

        let data_source = config
            .get("data_source")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let input_data = if data_source.is_empty() {
            context.to_json().await
        } else {
            match context.get(data_source).await {
                Some(data) => data,
                None => {
                    warn!(source = %data_source, "data source not found in context");
                    json!({})
                }
            }
        };

        let output_format = config
            .get("output_format")
            .and_then(Value::as_str)
            .unwrap_or("json");

        info!(
            has_data_source = !data_source.is_empty(),
            output_format, "executing transform"
        );

        if let Err(err) = self.template.validate(template) {
            error!(error = %err, "template parsing failed");
            return TaskResult::failure(format!("failed to parse template: {}", err));
        }

        let rendered = match self.template.render(template, &input_data) {
            Ok(rendered) => rendered,
            Err(err) => {
                error!(error = %err, "template rendering failed");
                return TaskResult::failure(format!("failed to render template: {}", err));
            }
        };

        let output = if output_format == "json" {
            match serde_json::from_str::<Value>(&rendered) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!(error = %err, "template output is not valid JSON, returning as string");
                    Value::String(rendered)
                }
            }
        } else {
            Value::String(rendered)
        };

        info!("transform completed successfully");
        TaskResult::success(output)
    }

    fn task_type(&self) -> &'static str {
        "transform"
    }
}
