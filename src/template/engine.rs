// ABOUTME: Template engine implementation using Handlebars
// ABOUTME: Provides template validation and rendering with the custom helper set

use handlebars::Handlebars;
use serde_json::Value;

use super::error::{Result, TemplateError};
use super::helpers;

/// Handlebars wrapper with the built-in transformation helpers registered.
///
/// HTML escaping is disabled: rendered output feeds JSON request bodies and
/// data reshaping, not HTML pages.
#[derive(Clone)]
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);
        helpers::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Check template syntax without rendering.
    pub fn validate(&self, template: &str) -> Result<()> {
        handlebars::Template::compile(template)
            .map(|_| ())
            .map_err(|e| TemplateError::SyntaxError(e.to_string()))
    }

    /// Render a template string against the given root value.
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}
