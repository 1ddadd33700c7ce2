// ABOUTME: HTML parser task executor extracting data with CSS selectors
// ABOUTME: Pulls text or attribute values from HTML content held in the context

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::engine::{ExecutionContext, TaskExecutor, TaskResult};

/// Extracts structured data from HTML content stored in the execution
/// context.
///
/// Config fields:
///   - `html_source` (string, required): context key holding the HTML; a
///     plain string or an object with a string `body` field (the HTTP
///     executor's output shape) are both accepted
///   - `selectors` (list, required, non-empty): entries of
///     `{name, selector, attribute?, multiple?}`
///
/// Output is a one-element list wrapping a map from selector names to
/// extracted values: a single trimmed string by default, or an ordered list
/// of trimmed strings (empty matches filtered) when `multiple` is set. The
/// surrounding list keeps a consistent shape for downstream transformers
/// that address elements positionally.
pub struct HtmlParserTask;

struct SelectorSpec {
    name: String,
    selector: String,
    attribute: String,
    multiple: bool,
}

#[async_trait]
impl TaskExecutor for HtmlParserTask {
    async fn execute(&self, context: &ExecutionContext, config: &Map<String, Value>) -> TaskResult {
        let html_source = config
            .get("html_source")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if html_source.is_empty() {
            return TaskResult::failure("missing or invalid 'html_source' in configuration");
        }

        let selector_entries = match config.get("selectors").and_then(Value::as_array) {
            Some(entries) if !entries.is_empty() => entries,
            _ => {
                return TaskResult::failure("missing or invalid 'selectors' in configuration");
            }
        };

        let selectors = match parse_selectors(selector_entries) {
            Ok(selectors) => selectors,
            Err(message) => {
                return TaskResult::failure(format!("invalid selector configuration: {}", message));
            }
        };

        let html = match context.get(html_source).await {
            None => {
                warn!(source = %html_source, "HTML source not found in context");
                return TaskResult::failure(format!(
                    "HTML source '{}' not found in context",
                    html_source
                ));
            }
            Some(Value::String(html)) => html,
            Some(Value::Object(map)) => match map.get("body") {
                Some(Value::String(body)) => body.clone(),
                _ => return TaskResult::failure("HTML content is not a string"),
            },
            Some(_) => return TaskResult::failure("HTML content is not a string"),
        };

        info!(source = %html_source, selector_count = selectors.len(), "executing HTML parser");

        match extract(&html, &selectors) {
            Ok(output) => {
                info!("HTML parsing completed successfully");
                TaskResult::success(output)
            }
            Err(message) => TaskResult::failure(message),
        }
    }

    fn task_type(&self) -> &'static str {
        "html_parser"
    }
}

fn parse_selectors(entries: &[Value]) -> Result<Vec<SelectorSpec>, String> {
    let mut selectors = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or_else(|| format!("selector at index {} is not a map", index))?;

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if name.is_empty() {
            return Err(format!("selector at index {} missing 'name'", index));
        }

        let selector = entry
            .get("selector")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if selector.is_empty() {
            return Err(format!("selector at index {} missing 'selector'", index));
        }

        selectors.push(SelectorSpec {
            name: name.to_string(),
            selector: selector.to_string(),
            attribute: entry
                .get("attribute")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            multiple: entry
                .get("multiple")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        });
    }

    Ok(selectors)
}

// Parsing and extraction stay synchronous: the parsed document is not Send
// and must not be held across an await point.
fn extract(html: &str, selectors: &[SelectorSpec]) -> Result<Value, String> {
    let document = Html::parse_document(html);
    let mut record = Map::new();

    for spec in selectors {
        let selector = Selector::parse(&spec.selector)
            .map_err(|e| format!("invalid selector '{}': {}", spec.selector, e))?;

        if spec.multiple {
            let values: Vec<Value> = document
                .select(&selector)
                .map(|element| extract_value(&element, &spec.attribute))
                .filter(|value| !value.is_empty())
                .map(Value::String)
                .collect();

            if values.is_empty() {
                warn!(selector = %spec.selector, name = %spec.name, "CSS selector returned no results");
            }
            record.insert(spec.name.clone(), Value::Array(values));
        } else {
            let value = document
                .select(&selector)
                .next()
                .map(|element| extract_value(&element, &spec.attribute))
                .unwrap_or_default();

            if value.is_empty() {
                warn!(selector = %spec.selector, name = %spec.name, "CSS selector returned no results");
            }
            record.insert(spec.name.clone(), Value::String(value));
        }
    }

    Ok(Value::Array(vec![Value::Object(record)]))
}

fn extract_value(element: &ElementRef, attribute: &str) -> String {
    if attribute.is_empty() {
        element.text().collect::<String>().trim().to_string()
    } else {
        element
            .value()
            .attr(attribute)
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LISTINGS_HTML: &str = r#"
        <html><body>
          <div class="listing">
            <h2 class="listing-title"> Beach House </h2>
            <span class="price-amount">$350</span>
            <a class="listing-link" href="/rooms/1">view</a>
          </div>
          <div class="listing">
            <h2 class="listing-title">Mountain Cabin</h2>
            <span class="price-amount">$275</span>
            <a class="listing-link" href="/rooms/2">view</a>
          </div>
          <div class="listing">
            <h2 class="listing-title">City Loft</h2>
            <span class="price-amount">$450</span>
            <a class="listing-link" href="/rooms/3">view</a>
          </div>
        </body></html>
    "#;

    fn config(entries: Value) -> Map<String, Value> {
        entries.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_multiple_extraction() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context
            .set("page", Value::String(LISTINGS_HTML.to_string()))
            .await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [
                        {"name": "titles", "selector": ".listing-title", "multiple": true},
                        {"name": "prices", "selector": ".price-amount", "multiple": true}
                    ]
                })),
            )
            .await;

        assert!(result.is_success());
        let record = &result.output[0];
        assert_eq!(
            record["titles"],
            json!(["Beach House", "Mountain Cabin", "City Loft"])
        );
        assert_eq!(record["prices"], json!(["$350", "$275", "$450"]));
    }

    #[tokio::test]
    async fn test_single_extraction_takes_first_match() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context
            .set("page", Value::String(LISTINGS_HTML.to_string()))
            .await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [{"name": "title", "selector": ".listing-title"}]
                })),
            )
            .await;

        assert!(result.is_success());
        assert_eq!(result.output[0]["title"], json!("Beach House"));
    }

    #[tokio::test]
    async fn test_attribute_extraction() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context
            .set("page", Value::String(LISTINGS_HTML.to_string()))
            .await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [{
                        "name": "links",
                        "selector": ".listing-link",
                        "attribute": "href",
                        "multiple": true
                    }]
                })),
            )
            .await;

        assert!(result.is_success());
        assert_eq!(
            result.output[0]["links"],
            json!(["/rooms/1", "/rooms/2", "/rooms/3"])
        );
    }

    #[tokio::test]
    async fn test_no_matches() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context
            .set("page", Value::String(LISTINGS_HTML.to_string()))
            .await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [
                        {"name": "none_multi", "selector": ".absent", "multiple": true},
                        {"name": "none_single", "selector": ".absent"}
                    ]
                })),
            )
            .await;

        assert!(result.is_success());
        assert_eq!(result.output[0]["none_multi"], json!([]));
        assert_eq!(result.output[0]["none_single"], json!(""));
    }

    #[tokio::test]
    async fn test_http_response_shape_source() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context
            .set(
                "fetch_result",
                json!({"status_code": 200, "body": LISTINGS_HTML}),
            )
            .await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "fetch_result",
                    "selectors": [{"name": "titles", "selector": ".listing-title", "multiple": true}]
                })),
            )
            .await;

        assert!(result.is_success());
        assert_eq!(
            result.output[0]["titles"],
            json!(["Beach House", "Mountain Cabin", "City Loft"])
        );
    }

    #[tokio::test]
    async fn test_missing_source_key() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "absent",
                    "selectors": [{"name": "x", "selector": ".a"}]
                })),
            )
            .await;

        assert!(!result.is_success());
        assert_eq!(
            result.error.as_deref(),
            Some("HTML source 'absent' not found in context")
        );
    }

    #[tokio::test]
    async fn test_non_string_source() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context.set("page", json!(42)).await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [{"name": "x", "selector": ".a"}]
                })),
            )
            .await;

        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("HTML content is not a string"));
    }

    #[tokio::test]
    async fn test_selector_entry_validation() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context.set("page", json!("<html></html>")).await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [
                        {"name": "ok", "selector": ".a"},
                        {"selector": ".b"}
                    ]
                })),
            )
            .await;

        assert!(!result.is_success());
        assert!(result
            .error
            .as_deref()
            .unwrap()
            .contains("selector at index 1 missing 'name'"));
    }

    #[tokio::test]
    async fn test_malformed_markup_is_tolerated() {
        let task = HtmlParserTask;
        let context = ExecutionContext::new();
        context
            .set("page", json!("<div class=a>unclosed<p>text"))
            .await;

        let result = task
            .execute(
                &context,
                &config(json!({
                    "html_source": "page",
                    "selectors": [{"name": "x", "selector": ".a"}]
                })),
            )
            .await;

        assert!(result.is_success());
        assert_eq!(result.output[0]["x"], json!("unclosedtext"));
    }
}
