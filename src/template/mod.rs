// ABOUTME: Template engine module for body interpolation and data transformation
// ABOUTME: Provides the Handlebars wrapper and its custom helper functions

pub mod engine;
pub mod error;
pub mod helpers;

pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
