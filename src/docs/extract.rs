//! Flatten a schema tree into the list of documented variables.

use crate::error::SchemaError;
use crate::schema::{EnvSchema, SchemaNode};
use crate::standard::JsonSchemaDoc;

/// One environment variable as seen by the documentation generator.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEnvvar {
    /// Environment variable name
    pub env_name: String,
    /// Group keys leading to the variable (e.g. `["app", "listen"]`), empty at the root
    pub path: Vec<String>,
    /// Decoded JSON-Schema description of the validator
    pub schema: JsonSchemaDoc,
    /// Whether validating an absent value fails
    pub required: bool,
}

/// Collect every variable of `schema`, depth-first in declaration order.
///
/// Every validator must expose a JSON-Schema description; the first one that
/// does not is reported with its dotted path, leaf key included.
///
/// # Example
///
/// ```
/// use envase::{env_schema, envvar};
/// use envase::docs::extract_envvars;
/// use envase::validators::{number, string};
///
/// let schema = env_schema! {
///     api_key: envvar("API_KEY", string()),
///     server: { port: envvar("PORT", number::<u16>()) },
/// };
///
/// let vars = extract_envvars(&schema).unwrap();
/// assert_eq!(vars[0].env_name, "API_KEY");
/// assert!(vars[0].path.is_empty());
/// assert_eq!(vars[1].path, vec!["server".to_string()]);
/// ```
pub fn extract_envvars(schema: &EnvSchema) -> Result<Vec<ExtractedEnvvar>, SchemaError> {
    let mut extracted = Vec::with_capacity(schema.leaf_count());
    extract_into(schema, &mut Vec::new(), &mut extracted)?;
    Ok(extracted)
}

fn extract_into(
    schema: &EnvSchema,
    path: &mut Vec<String>,
    out: &mut Vec<ExtractedEnvvar>,
) -> Result<(), SchemaError> {
    for (key, node) in schema {
        match node {
            SchemaNode::Group(group) => {
                path.push(key.clone());
                extract_into(group, path, out)?;
                path.pop();
            }
            SchemaNode::Var(var) => {
                let leaf_path = || {
                    path.iter()
                        .chain(std::iter::once(key))
                        .map(String::as_str)
                        .collect::<Vec<_>>()
                        .join(".")
                };
                let json = var.json_schema().ok_or_else(|| SchemaError::NotJsonSchema {
                    path: leaf_path(),
                })?;
                let doc = JsonSchemaDoc::from_json(json).map_err(|err| {
                    SchemaError::InvalidJsonSchema {
                        path: leaf_path(),
                        message: err.to_string(),
                    }
                })?;

                out.push(ExtractedEnvvar {
                    env_name: var.name().to_string(),
                    path: path.clone(),
                    schema: doc,
                    required: var.is_required(),
                });
            }
        }
    }
    Ok(())
}
