// ABOUTME: Error types for template engine operations
// ABOUTME: Separates template syntax errors from render-time errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    SyntaxError(String),

    #[error("template render error: {0}")]
    RenderError(#[from] handlebars::RenderError),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
