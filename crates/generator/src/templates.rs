//! Template loading and management

use std::collections::HashMap;
use swagger_graphql_common::{CompileError, Result};
use tera::{Tera, Value};

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("block_string", block_string_filter);

    tera.add_raw_template(
        "schema.graphql",
        include_str!("../templates/schema.graphql.tera"),
    )
    .map_err(|e| {
        CompileError::Generation(format!("Failed to load schema.graphql template: {}", e))
    })?;

    Ok(tera)
}

/// Render a description as a GraphQL block string followed by a line break
///
/// The caller emits the indentation of the opening quotes; `indent` prefixes
/// every following line, including the one after the closing quotes, so the
/// documented definition stays aligned. Missing or empty descriptions render
/// as nothing.
fn block_string_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let description = match value {
        Value::Null => return Ok(Value::String(String::new())),
        Value::String(s) if s.trim().is_empty() => return Ok(Value::String(String::new())),
        Value::String(s) => s,
        _ => return Err(tera::Error::msg("block_string filter expects a string")),
    };

    let indent = match args.get("indent") {
        Some(Value::String(indent)) => indent.as_str(),
        Some(_) => return Err(tera::Error::msg("block_string indent must be a string")),
        None => "",
    };

    let body = description
        .trim()
        .replace("\"\"\"", "\\\"\"\"")
        .lines()
        .map(|line| format!("{}{}", indent, line.trim_end()))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Value::String(format!(
        "\"\"\"\n{body}\n{indent}\"\"\"\n{indent}",
        indent = indent,
        body = body
    )))
}
