// ABOUTME: HTTP request task executor with body templating and response shaping
// ABOUTME: Performs outbound requests and records status, headers, and parsed body

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::engine::{ExecutionContext, TaskExecutor, TaskResult};
use crate::template::TemplateEngine;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Executes HTTP requests with dynamic body interpolation from the
/// execution context.
///
/// Config fields:
///   - `method` (string, required): request method, case-normalized to upper
///   - `url` (string, required): absolute target URL
///   - `headers` (string map, optional): set verbatim on the request
///   - `body` (string, optional): request body; rendered as a template with
///     the context snapshot bound to the top-level `context` name
///   - `timeout` (integer seconds, optional, default 30)
///
/// Success output: `{status_code, headers, body}` where `body` is parsed as
/// JSON when the response declares `application/json` and kept as a raw
/// string otherwise.
pub struct HttpRequestTask {
    template: TemplateEngine,
}

impl HttpRequestTask {
    pub fn new() -> Self {
        Self {
            template: TemplateEngine::new(),
        }
    }
}

impl Default for HttpRequestTask {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskExecutor for HttpRequestTask {
    async fn execute(&self, context: &ExecutionContext, config: &Map<String, Value>) -> TaskResult {
        let method = config
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if method.is_empty() {
            return TaskResult::failure("missing or invalid 'method' in configuration");
        }

        let url = config.get("url").and_then(Value::as_str).unwrap_or_default();
        if url.is_empty() {
            return TaskResult::failure("missing or invalid 'url' in configuration");
        }

        let timeout = config
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let mut body = config
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // Interpolate the body against the current context snapshot.
        if !body.is_empty() {
            let data = json!({"context": context.to_json().await});
            body = match self.template.render(&body, &data) {
                Ok(rendered) => rendered,
                Err(err) => {
                    error!(error = %err, "failed to interpolate request body");
                    return TaskResult::failure(format!("body interpolation failed: {}", err));
                }
            };
        }

        let request_method =
            match reqwest::Method::from_bytes(method.to_uppercase().as_bytes()) {
                Ok(m) => m,
                Err(err) => {
                    return TaskResult::failure(format!("failed to create request: {}", err));
                }
            };

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
        {
            Ok(client) => client,
            Err(err) => {
                return TaskResult::failure(format!("failed to create request: {}", err));
            }
        };

        let mut request = client.request(request_method, url);

        let mut has_content_type = false;
        if let Some(headers) = config.get("headers").and_then(Value::as_object) {
            for (key, value) in headers {
                if let Some(value) = value.as_str() {
                    if key.eq_ignore_ascii_case("content-type") {
                        has_content_type = true;
                    }
                    request = request.header(key, value);
                }
            }
        }

        if !body.is_empty() {
            if !has_content_type {
                request = request.header("Content-Type", "application/json");
            }
            request = request.body(body);
        }

        info!(method = %method, url = %url, "executing HTTP request");
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "HTTP request failed");
                return TaskResult::failure(format!("request execution failed: {}", err));
            }
        };

        let status_code = response.status().as_u16();

        let mut response_headers = Map::new();
        for (name, value) in response.headers() {
            response_headers.insert(
                name.to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            );
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let response_body = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                error!(error = %err, "failed to read response body");
                return TaskResult::failure(format!("failed to read response: {}", err));
            }
        };

        if status_code >= 400 {
            warn!(status_code, "HTTP request returned error status");
            return TaskResult::failure(format!("HTTP {}: {}", status_code, response_body));
        }

        // Parse the body as JSON only when the server declares it as such;
        // a declared-but-malformed JSON body falls back to the raw string.
        let parsed_body = if content_type.contains("application/json") {
            serde_json::from_str::<Value>(&response_body)
                .unwrap_or(Value::String(response_body))
        } else {
            Value::String(response_body)
        };

        info!(status_code, "HTTP request completed successfully");
        TaskResult::success(json!({
            "status_code": status_code,
            "headers": response_headers,
            "body": parsed_body,
        }))
    }

    fn task_type(&self) -> &'static str {
        "http_request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(entries: Value) -> Map<String, Value> {
        entries.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_missing_method() {
        let task = HttpRequestTask::new();
        let context = ExecutionContext::new();

        let result = task
            .execute(&context, &config(json!({"url": "http://example.com"})))
            .await;
        assert!(!result.is_success());
        assert_eq!(
            result.error.as_deref(),
            Some("missing or invalid 'method' in configuration")
        );
    }

    #[tokio::test]
    async fn test_missing_url() {
        let task = HttpRequestTask::new();
        let context = ExecutionContext::new();

        let result = task
            .execute(&context, &config(json!({"method": "GET"})))
            .await;
        assert!(!result.is_success());
        assert_eq!(
            result.error.as_deref(),
            Some("missing or invalid 'url' in configuration")
        );
    }

    #[tokio::test]
    async fn test_wrong_typed_method_treated_as_missing() {
        let task = HttpRequestTask::new();
        let context = ExecutionContext::new();

        let result = task
            .execute(
                &context,
                &config(json!({"method": 42, "url": "http://example.com"})),
            )
            .await;
        assert!(!result.is_success());
        assert_eq!(
            result.error.as_deref(),
            Some("missing or invalid 'method' in configuration")
        );
    }

    #[tokio::test]
    async fn test_body_interpolation_failure() {
        let task = HttpRequestTask::new();
        let context = ExecutionContext::new();

        let result = task
            .execute(
                &context,
                &config(json!({
                    "method": "POST",
                    "url": "http://example.com",
                    "body": "{{#unclosed"
                })),
            )
            .await;
        assert!(!result.is_success());
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .starts_with("body interpolation failed:"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let task = HttpRequestTask::new();
        let context = ExecutionContext::new();

        // Nothing listens on this port.
        let result = task
            .execute(
                &context,
                &config(json!({
                    "method": "GET",
                    "url": "http://127.0.0.1:1",
                    "timeout": 2
                })),
            )
            .await;
        assert!(!result.is_success());
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .starts_with("request execution failed:"));
    }
}
