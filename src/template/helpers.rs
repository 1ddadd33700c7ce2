// ABOUTME: Handlebars helper functions for data transformation templates
// ABOUTME: Implements string casing, trimming, joining, JSON encoding, and defaulting

use handlebars::{Context, Handlebars, Helper, Output, RenderContext, RenderError};
use serde_json::Value;

/// Render a JSON value the way it should appear inside template output:
/// strings bare, everything else in its JSON form.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `toUpper` - convert a string to uppercase.
pub fn to_upper_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("toUpper helper requires a string parameter"))?;

    out.write(&input.to_uppercase())?;
    Ok(())
}

/// `toLower` - convert a string to lowercase.
pub fn to_lower_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("toLower helper requires a string parameter"))?;

    out.write(&input.to_lowercase())?;
    Ok(())
}

/// `trim` - trim whitespace from both ends of a string.
pub fn trim_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let input = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("trim helper requires a string parameter"))?;

    out.write(input.trim())?;
    Ok(())
}

/// `join sep items` - join array elements with a separator.
pub fn join_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let separator = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| RenderError::new("join helper requires a separator parameter"))?;

    let items = h
        .param(1)
        .and_then(|v| v.value().as_array())
        .ok_or_else(|| RenderError::new("join helper requires an array parameter"))?;

    let joined = items
        .iter()
        .map(value_to_string)
        .collect::<Vec<String>>()
        .join(separator);

    out.write(&joined)?;
    Ok(())
}

/// `toJSON value` - encode any value as a JSON string.
pub fn to_json_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let value = h
        .param(0)
        .map(|v| v.value())
        .ok_or_else(|| RenderError::new("toJSON helper requires a value parameter"))?;

    let encoded = serde_json::to_string(value)
        .map_err(|e| RenderError::new(format!("toJSON encoding failed: {}", e)))?;

    out.write(&encoded)?;
    Ok(())
}

/// `default fallback value` - yield the fallback when the value is null or
/// an empty string, the value otherwise.
pub fn default_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> std::result::Result<(), RenderError> {
    let fallback = h
        .param(0)
        .map(|v| v.value())
        .ok_or_else(|| RenderError::new("default helper requires a fallback parameter"))?;

    let value = h.param(1).map(|v| v.value()).unwrap_or(&Value::Null);

    let chosen = match value {
        Value::Null => fallback,
        Value::String(s) if s.is_empty() => fallback,
        other => other,
    };

    out.write(&value_to_string(chosen))?;
    Ok(())
}

/// Register all transformation helpers with a Handlebars instance.
pub fn register_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("toUpper", Box::new(to_upper_helper));
    handlebars.register_helper("toLower", Box::new(to_lower_helper));
    handlebars.register_helper("trim", Box::new(trim_helper));
    handlebars.register_helper("join", Box::new(join_helper));
    handlebars.register_helper("toJSON", Box::new(to_json_helper));
    handlebars.register_helper("default", Box::new(default_helper));
}
