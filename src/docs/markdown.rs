//! Markdown rendering of extracted environment variables.

use indexmap::IndexMap;

use super::extract::ExtractedEnvvar;
use crate::standard::JsonSchemaDoc;

/// First line of every generated document.
pub const MARKDOWN_HEADER: &str = "# Environment variables";

const DETAIL_SEPARATOR: &str = "  \n  ";

/// Render `envvars` as a markdown document.
///
/// Variables are grouped by their path in first-seen order. Root variables
/// come without a heading; every other group gets a `##` heading made of its
/// capitalised path parts. Each variable is one list item followed by a
/// blank line.
///
/// # Example
///
/// ```
/// use envase::{env_schema, envvar};
/// use envase::docs::{extract_envvars, generate_markdown};
/// use envase::validators::{number, StandardSchemaExt};
///
/// let schema = env_schema! {
///     port: envvar("PORT", number::<u16>().with_default(3000).describe("Listening port")),
/// };
///
/// let markdown = generate_markdown(&extract_envvars(&schema).unwrap());
/// assert_eq!(
///     markdown,
///     "# Environment variables\n\n- `PORT` *(integer)*  \n  Listening port  \n  Default: `3000`\n"
/// );
/// ```
pub fn generate_markdown(envvars: &[ExtractedEnvvar]) -> String {
    let mut lines: Vec<String> = vec![MARKDOWN_HEADER.to_string(), String::new()];

    let mut by_path: IndexMap<String, Vec<&ExtractedEnvvar>> = IndexMap::new();
    for envvar in envvars {
        by_path.entry(envvar.path.join(".")).or_default().push(envvar);
    }

    for (path, group) in &by_path {
        if !path.is_empty() {
            lines.push(format!("## {}", section_name(path)));
            lines.push(String::new());
        }

        for envvar in group {
            lines.push(render_item(envvar));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

fn section_name(path: &str) -> String {
    path.split('.').map(capitalize).collect::<Vec<_>>().join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render_item(envvar: &ExtractedEnvvar) -> String {
    let schema = &envvar.schema;
    let prefix = if envvar.required { "**(REQUIRED)**" } else { "" };
    let mut item = format!("- {}`{}` *({})*", prefix, envvar.env_name, type_label(schema));

    for detail in details(schema) {
        item.push_str(DETAIL_SEPARATOR);
        item.push_str(&detail);
    }
    item
}

fn type_label(schema: &JsonSchemaDoc) -> String {
    let names = schema.type_names();
    if names.is_empty() {
        "unknown".to_string()
    } else {
        names.join(" | ")
    }
}

fn details(schema: &JsonSchemaDoc) -> Vec<String> {
    let mut details = Vec::new();

    if let Some(description) = schema.description.as_deref().filter(|d| !d.is_empty()) {
        details.push(description.to_string());
    }
    if let Some(values) = &schema.enum_values {
        let values: Vec<String> = values.iter().map(|v| format!("`{}`", display_json(v))).collect();
        details.push(format!("Supported values: {}", values.join(" | ")));
    }
    if let Some(pattern) = schema.pattern.as_deref().filter(|p| !p.is_empty()) {
        details.push(format!("Pattern: `{}`", pattern));
    }
    if let Some(format) = schema.format.as_deref().filter(|f| !f.is_empty()) {
        details.push(format!("Format: `{}`", format));
    }
    if let Some(default) = schema.default.as_ref().filter(|d| !d.is_null()) {
        details.push(format!("Default: `{}`", display_json(default)));
    }
    if let Some(minimum) = &schema.minimum {
        details.push(format!("Minimum: `{}`", display_json(minimum)));
    }
    if let Some(maximum) = &schema.maximum {
        details.push(format!("Maximum: `{}`", display_json(maximum)));
    }
    if let Some(min_length) = schema.min_length {
        details.push(format!("Min length: `{}`", min_length));
    }
    if let Some(max_length) = schema.max_length {
        details.push(format!("Max length: `{}`", max_length));
    }

    details
}

/// Strings render bare, everything else as compact JSON.
fn display_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
