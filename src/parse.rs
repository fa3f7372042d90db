//! The parse engine: validate every variable of a schema against an
//! environment and assemble the output tree.
//!
//! The walk is depth-first in declaration order. Validation failures do not
//! stop the walk; they are collected and reported together once every leaf
//! has been visited. A validator that answers asynchronously is a usage
//! error and aborts immediately.

use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};

use crate::env::ConfigEnv;
use crate::error::{EnvError, EnvValidationError, EnvvarIssue};
use crate::schema::{EnvSchema, SchemaNode};
use crate::standard::Checked;
use crate::value::Value;

/// Parse `env` against `schema`, returning a tree that mirrors the schema.
///
/// Every leaf is replaced by its validator's output. When any variable fails
/// validation the result is a single [`EnvError::Validation`] carrying every
/// failing variable in traversal order.
///
/// # Example
///
/// ```
/// use envase::{env_schema, envvar, parse_env};
/// use envase::env::MockEnv;
/// use envase::validators::number;
///
/// let schema = env_schema! { port: envvar("PORT", number::<u16>()) };
/// let env = MockEnv::new().with_env("PORT", "3000");
///
/// let parsed = parse_env(&env, &schema).unwrap();
/// assert_eq!(parsed.get("port").and_then(|v| v.as_integer()), Some(3000));
/// ```
pub fn parse_env(env: &dyn ConfigEnv, schema: &EnvSchema) -> Result<Value, EnvError> {
    debug!(variables = schema.leaf_count(), "parsing environment");

    let mut issues = Vec::new();
    let parsed = parse_tree(env, schema, &mut issues)?;

    match EnvValidationError::from_vec(issues) {
        Some(error) => {
            debug!(issues = error.len(), "environment validation failed");
            Err(EnvError::Validation(error))
        }
        None => {
            debug!("environment parsed");
            Ok(parsed)
        }
    }
}

/// Parse `env` against `schema` and deserialize the tree into `T`.
///
/// `T` declares the output shape; a mismatch between `T` and the schema is
/// reported as [`EnvError::Shape`].
pub fn parse_env_as<T: DeserializeOwned>(
    env: &dyn ConfigEnv,
    schema: &EnvSchema,
) -> Result<T, EnvError> {
    let parsed = parse_env(env, schema)?;
    parsed.deserialize_into().map_err(|err| EnvError::Shape {
        message: err.to_string(),
    })
}

fn parse_tree(
    env: &dyn ConfigEnv,
    schema: &EnvSchema,
    issues: &mut Vec<EnvvarIssue>,
) -> Result<Value, EnvError> {
    let mut table = indexmap::IndexMap::with_capacity(schema.len());

    for (key, node) in schema {
        let value = match node {
            SchemaNode::Group(group) => parse_tree(env, group, issues)?,
            SchemaNode::Var(var) => {
                let raw = env.get_env(var.name());
                trace!(name = var.name(), present = raw.is_some(), "validating variable");

                match var.check(raw.as_deref()) {
                    Checked::Valid(value) => value,
                    Checked::Invalid(messages) => {
                        issues.push(EnvvarIssue::new(var.name(), raw, messages));
                        Value::Null
                    }
                    Checked::Pending => {
                        warn!(name = var.name(), "validator returned an asynchronous result");
                        return Err(EnvError::AsyncValidation {
                            name: var.name().to_string(),
                        });
                    }
                }
            }
        };
        table.insert(key.clone(), value);
    }

    Ok(Value::Table(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use crate::schema::envvar;
    use crate::standard::{StandardResult, StandardSchema};
    use crate::validators::{boolean, number, string, StandardSchemaExt};
    use stillwater::Validation;

    struct Deferred;

    impl StandardSchema for Deferred {
        type Output = String;

        fn validate(&self, _input: Option<&str>) -> StandardResult<String> {
            StandardResult::pending(async { Validation::Success(String::new()) })
        }
    }

    /// Records exactly what the engine handed to the validator.
    struct EchoInput;

    impl StandardSchema for EchoInput {
        type Output = String;

        fn validate(&self, input: Option<&str>) -> StandardResult<String> {
            StandardResult::success(match input {
                None => "<absent>".to_string(),
                Some(raw) => format!("<{}>", raw),
            })
        }
    }

    #[test]
    fn test_empty_schema_parses_to_empty_table() {
        let parsed = parse_env(&MockEnv::new(), &EnvSchema::new()).unwrap();
        assert_eq!(parsed, Value::table());
    }

    #[test]
    fn test_nested_tree_mirrors_schema() {
        let schema = EnvSchema::new()
            .var("debug", envvar("DEBUG", boolean()))
            .group(
                "db",
                EnvSchema::new()
                    .var("host", envvar("DB_HOST", string()))
                    .var("port", envvar("DB_PORT", number::<u16>())),
            );
        let env = MockEnv::new()
            .with_env("DEBUG", "true")
            .with_env("DB_HOST", "localhost")
            .with_env("DB_PORT", "5432");

        let parsed = parse_env(&env, &schema).unwrap();

        assert_eq!(parsed.get_path("debug"), Some(&Value::Bool(true)));
        assert_eq!(parsed.get_path("db.host"), Some(&Value::from("localhost")));
        assert_eq!(parsed.get_path("db.port"), Some(&Value::Integer(5432)));
        let keys: Vec<&String> = parsed.as_table().unwrap().keys().collect();
        assert_eq!(keys, vec!["debug", "db"]);
    }

    #[test]
    fn test_absent_and_empty_are_distinct() {
        let schema = EnvSchema::new()
            .var("missing", envvar("MISSING", EchoInput))
            .var("empty", envvar("EMPTY", EchoInput));
        let env = MockEnv::new().with_env("EMPTY", "");

        let parsed = parse_env(&env, &schema).unwrap();

        assert_eq!(parsed.get("missing"), Some(&Value::from("<absent>")));
        assert_eq!(parsed.get("empty"), Some(&Value::from("<>")));
    }

    #[test]
    fn test_collects_every_failure_in_traversal_order() {
        let schema = EnvSchema::new()
            .var("a", envvar("A", number::<i32>()))
            .group(
                "nested",
                EnvSchema::new()
                    .var("b", envvar("B", string()))
                    .var("ok", envvar("OK", string())),
            )
            .var("c", envvar("C", boolean()));
        let env = MockEnv::new()
            .with_env("A", "abc")
            .with_env("OK", "fine")
            .with_env("C", "maybe");

        let error = parse_env(&env, &schema).unwrap_err();
        let validation = error.validation().unwrap();

        assert_eq!(validation.names(), vec!["A", "B", "C"]);
        assert_eq!(validation.first().value.as_deref(), Some("abc"));
        let b = validation.issues().nth(1).unwrap();
        assert_eq!(b.value, None);
        assert_eq!(b.messages, vec!["Required".to_string()]);
    }

    #[test]
    fn test_pending_result_aborts_without_aggregating() {
        let schema = EnvSchema::new()
            .var("bad", envvar("BAD", number::<u8>()))
            .var("slow", envvar("SLOW", Deferred));
        let env = MockEnv::new().with_env("BAD", "nope");

        let error = parse_env(&env, &schema).unwrap_err();

        assert!(!error.is_validation());
        assert_eq!(
            error.to_string(),
            "Schema validation for envvar \"SLOW\" must be synchronous"
        );
    }

    #[test]
    fn test_defaults_and_optionals() {
        let schema = EnvSchema::new()
            .var("port", envvar("PORT", number::<u16>().with_default(8080)))
            .var("name", envvar("NAME", string().optional()));

        let parsed = parse_env(&MockEnv::new(), &schema).unwrap();

        assert_eq!(parsed.get("port"), Some(&Value::Integer(8080)));
        assert_eq!(parsed.get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_parse_env_as_typed() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Db {
            host: String,
            port: u16,
        }

        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct App {
            db: Db,
        }

        let schema = EnvSchema::new().group(
            "db",
            EnvSchema::new()
                .var("host", envvar("DB_HOST", string()))
                .var("port", envvar("DB_PORT", number::<u16>())),
        );
        let env = MockEnv::new()
            .with_env("DB_HOST", "localhost")
            .with_env("DB_PORT", "5432");

        let app: App = parse_env_as(&env, &schema).unwrap();
        assert_eq!(
            app,
            App {
                db: Db {
                    host: "localhost".to_string(),
                    port: 5432
                }
            }
        );
    }

    #[test]
    fn test_parse_env_as_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Wrong {
            port: bool,
        }

        let schema = EnvSchema::new().var("port", envvar("PORT", number::<u16>()));
        let env = MockEnv::new().with_env("PORT", "80");

        let error = parse_env_as::<Wrong>(&env, &schema).unwrap_err();
        assert!(matches!(error, EnvError::Shape { .. }));
    }
}
