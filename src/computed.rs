//! Computed values derived from an already parsed configuration.
//!
//! A [`ComputedSchema`] mirrors the shape of a schema tree, but its leaves are
//! functions of the parsed configuration instead of environment bindings.
//! Every function receives the whole parsed tree, so a computed field can
//! combine values from unrelated branches. Results are deep-merged over the
//! parsed tree; on conflicts the computed side wins.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::env::ConfigEnv;
use crate::error::EnvError;
use crate::parse::parse_env;
use crate::schema::EnvSchema;
use crate::value::{SerializeError, Value};

type ComputeFn<R> = Arc<dyn Fn(&R) -> Result<Value, SerializeError> + Send + Sync>;

/// A node of a computed tree.
pub enum ComputedNode<R> {
    /// Function of the parsed configuration
    Field(ComputeFn<R>),
    /// Nested group of computed nodes
    Group(ComputedSchema<R>),
}

impl<R> Clone for ComputedNode<R> {
    fn clone(&self) -> Self {
        match self {
            ComputedNode::Field(f) => ComputedNode::Field(Arc::clone(f)),
            ComputedNode::Group(group) => ComputedNode::Group(group.clone()),
        }
    }
}

impl<R> fmt::Debug for ComputedNode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputedNode::Field(_) => f.write_str("Field(..)"),
            ComputedNode::Group(group) => f.debug_tuple("Group").field(group).finish(),
        }
    }
}

/// A tree of derivation functions over a parsed configuration of shape `R`.
///
/// `R` defaults to the untyped [`Value`] tree. Any `Deserialize` type can be
/// used instead, in which case the parsed tree is deserialized into `R` once
/// and every function borrows the same instance.
///
/// # Example
///
/// ```
/// use envase::computed::ComputedSchema;
/// use envase::Value;
///
/// let computed = ComputedSchema::<Value>::new()
///     .field("db_url", |raw: &Value| {
///         format!(
///             "postgres://{}:{}",
///             raw.get_path("db.host").and_then(Value::as_str).unwrap_or_default(),
///             raw.get_path("db.port").and_then(Value::as_integer).unwrap_or_default(),
///         )
///     })
///     .group(
///         "db",
///         ComputedSchema::new().field("is_local", |raw: &Value| {
///             raw.get_path("db.host").and_then(Value::as_str) == Some("localhost")
///         }),
///     );
///
/// assert_eq!(computed.leaf_count(), 2);
/// ```
pub struct ComputedSchema<R = Value> {
    entries: IndexMap<String, ComputedNode<R>>,
}

impl<R> Default for ComputedSchema<R> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<R> Clone for ComputedSchema<R> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<R> fmt::Debug for ComputedSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<R> ComputedSchema<R> {
    /// Create an empty computed tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a computed field under `key`.
    pub fn field<O, F>(mut self, key: impl Into<String>, compute: F) -> Self
    where
        R: 'static,
        O: Serialize + 'static,
        F: Fn(&R) -> O + Send + Sync + 'static,
    {
        let compute: ComputeFn<R> = Arc::new(move |raw: &R| Value::from_serialize(&compute(raw)));
        self.entries.insert(key.into(), ComputedNode::Field(compute));
        self
    }

    /// Add a nested group under `key`.
    pub fn group(mut self, key: impl Into<String>, group: ComputedSchema<R>) -> Self {
        self.entries.insert(key.into(), ComputedNode::Group(group));
        self
    }

    /// Get a direct child node.
    pub fn get(&self, key: &str) -> Option<&ComputedNode<R>> {
        self.entries.get(key)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the tree has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of computed fields at any depth.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                ComputedNode::Field(_) => 1,
                ComputedNode::Group(group) => group.leaf_count(),
            })
            .sum()
    }

    /// Evaluate every function against `raw`, producing a tree of the same shape.
    pub fn evaluate(&self, raw: &R) -> Result<Value, EnvError> {
        let mut path = Vec::new();
        self.evaluate_at(raw, &mut path)
    }

    fn evaluate_at<'a>(&'a self, raw: &R, path: &mut Vec<&'a str>) -> Result<Value, EnvError> {
        let mut table = IndexMap::with_capacity(self.entries.len());
        for (key, node) in &self.entries {
            path.push(key);
            let value = match node {
                ComputedNode::Field(compute) => compute(raw).map_err(|err| EnvError::Computed {
                    path: path.join("."),
                    message: err.to_string(),
                })?,
                ComputedNode::Group(group) => group.evaluate_at(raw, path)?,
            };
            path.pop();
            table.insert(key.clone(), value);
        }
        Ok(Value::Table(table))
    }
}

/// A schema together with its optional computed values.
pub struct ConfigDefinition<R = Value> {
    schema: EnvSchema,
    computed: Option<ComputedSchema<R>>,
}

impl<R> Clone for ConfigDefinition<R> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            computed: self.computed.clone(),
        }
    }
}

impl<R> fmt::Debug for ConfigDefinition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDefinition")
            .field("schema", &self.schema)
            .field("computed", &self.computed)
            .finish()
    }
}

impl<R> ConfigDefinition<R> {
    /// A definition without computed values.
    pub fn new(schema: EnvSchema) -> Self {
        Self {
            schema,
            computed: None,
        }
    }

    /// Attach computed values.
    pub fn with_computed(mut self, computed: ComputedSchema<R>) -> Self {
        self.computed = Some(computed);
        self
    }

    /// The environment schema.
    pub fn schema(&self) -> &EnvSchema {
        &self.schema
    }

    /// The computed tree, if any.
    pub fn computed(&self) -> Option<&ComputedSchema<R>> {
        self.computed.as_ref()
    }
}

impl<R> From<EnvSchema> for ConfigDefinition<R> {
    fn from(schema: EnvSchema) -> Self {
        Self::new(schema)
    }
}

/// Parse the environment and merge computed values into the result.
///
/// Computed functions never run when parsing fails. Without a computed tree
/// the result is exactly what [`parse_env`] returns.
///
/// # Example
///
/// ```
/// use envase::{create_config, env_schema, envvar, Value};
/// use envase::computed::{ComputedSchema, ConfigDefinition};
/// use envase::env::MockEnv;
/// use envase::validators::{number, string};
///
/// let schema = env_schema! {
///     db: {
///         host: envvar("DB_HOST", string()),
///         port: envvar("DB_PORT", number::<u16>()),
///     },
/// };
/// let computed = ComputedSchema::new().field("db_url", |raw: &Value| {
///     format!(
///         "postgres://{}:{}",
///         raw.get_path("db.host").and_then(Value::as_str).unwrap_or_default(),
///         raw.get_path("db.port").and_then(Value::as_integer).unwrap_or_default(),
///     )
/// });
/// let env = MockEnv::new()
///     .with_env("DB_HOST", "localhost")
///     .with_env("DB_PORT", "5432");
///
/// let config = create_config(&env, &ConfigDefinition::new(schema).with_computed(computed)).unwrap();
/// assert_eq!(
///     config.get("db_url").and_then(Value::as_str),
///     Some("postgres://localhost:5432")
/// );
/// ```
pub fn create_config<R: DeserializeOwned>(
    env: &dyn ConfigEnv,
    definition: &ConfigDefinition<R>,
) -> Result<Value, EnvError> {
    let parsed = parse_env(env, &definition.schema)?;

    let Some(computed) = &definition.computed else {
        return Ok(parsed);
    };

    let raw: R = parsed.deserialize_into().map_err(|err| EnvError::Shape {
        message: err.to_string(),
    })?;
    debug!(fields = computed.leaf_count(), "evaluating computed values");
    let evaluated = computed.evaluate(&raw)?;

    Ok(parsed.deep_merge(&evaluated))
}

/// [`create_config`] followed by deserialization into `T`.
pub fn create_config_as<R, T>(
    env: &dyn ConfigEnv,
    definition: &ConfigDefinition<R>,
) -> Result<T, EnvError>
where
    R: DeserializeOwned,
    T: DeserializeOwned,
{
    create_config(env, definition)?
        .deserialize_into()
        .map_err(|err| EnvError::Shape {
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use crate::schema::envvar;
    use crate::validators::{number, string};
    use serde::ser::Error as _;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn db_schema() -> EnvSchema {
        EnvSchema::new().group(
            "db",
            EnvSchema::new()
                .var("host", envvar("DB_HOST", string()))
                .var("port", envvar("DB_PORT", number::<u16>())),
        )
    }

    fn db_env() -> MockEnv {
        MockEnv::new()
            .with_env("DB_HOST", "localhost")
            .with_env("DB_PORT", "5432")
    }

    #[test]
    fn test_evaluate_mirrors_shape() {
        let computed = ComputedSchema::<Value>::new()
            .field("answer", |_: &Value| 42)
            .group("nested", ComputedSchema::new().field("flag", |_: &Value| true));

        let evaluated = computed.evaluate(&Value::table()).unwrap();

        assert_eq!(evaluated.get("answer"), Some(&Value::Integer(42)));
        assert_eq!(evaluated.get_path("nested.flag"), Some(&Value::Bool(true)));
        assert_eq!(computed.leaf_count(), 2);
    }

    #[test]
    fn test_without_computed_equals_parse() {
        let definition: ConfigDefinition = ConfigDefinition::new(db_schema());
        let config = create_config(&db_env(), &definition).unwrap();
        assert_eq!(config, parse_env(&db_env(), &db_schema()).unwrap());
    }

    #[test]
    fn test_nested_computed_keeps_siblings() {
        let computed = ComputedSchema::new().group(
            "db",
            ComputedSchema::new().field("is_local", |raw: &Value| {
                raw.get_path("db.host").and_then(Value::as_str) == Some("localhost")
            }),
        );
        let definition = ConfigDefinition::new(db_schema()).with_computed(computed);

        let config = create_config(&db_env(), &definition).unwrap();

        assert_eq!(config.get_path("db.host"), Some(&Value::from("localhost")));
        assert_eq!(config.get_path("db.port"), Some(&Value::Integer(5432)));
        assert_eq!(config.get_path("db.is_local"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_computed_overrides_raw_value() {
        let computed = ComputedSchema::new().field("db", |_: &Value| "flattened");
        let definition = ConfigDefinition::new(db_schema()).with_computed(computed);

        let config = create_config(&db_env(), &definition).unwrap();
        assert_eq!(config.get("db"), Some(&Value::from("flattened")));
    }

    #[test]
    fn test_typed_raw_shape() {
        #[derive(Deserialize)]
        struct Db {
            host: String,
            port: u16,
        }

        #[derive(Deserialize)]
        struct Raw {
            db: Db,
        }

        let computed = ComputedSchema::<Raw>::new().field("db_url", |raw: &Raw| {
            format!("postgres://{}:{}", raw.db.host, raw.db.port)
        });
        let definition = ConfigDefinition::new(db_schema()).with_computed(computed);

        let config = create_config(&db_env(), &definition).unwrap();
        assert_eq!(
            config.get("db_url"),
            Some(&Value::from("postgres://localhost:5432"))
        );
    }

    #[test]
    fn test_computed_not_run_when_parse_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let computed = ComputedSchema::new().field("x", move |_: &Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            1
        });
        let definition = ConfigDefinition::new(db_schema()).with_computed(computed);

        let error = create_config(&MockEnv::new(), &definition).unwrap_err();

        assert!(error.is_validation());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unrepresentable_output_names_path() {
        struct Unrepresentable;

        impl Serialize for Unrepresentable {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(S::Error::custom("cannot serialize"))
            }
        }

        let computed = ComputedSchema::<Value>::new().group(
            "a",
            ComputedSchema::new().field("b", |_: &Value| Unrepresentable),
        );

        let error = computed.evaluate(&Value::table()).unwrap_err();
        match error {
            EnvError::Computed { path, message } => {
                assert_eq!(path, "a.b");
                assert!(message.contains("cannot serialize"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_create_config_as() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Final {
            db_url: String,
        }

        let computed = ComputedSchema::new().field("db_url", |raw: &Value| {
            format!(
                "postgres://{}",
                raw.get_path("db.host").and_then(Value::as_str).unwrap_or_default()
            )
        });
        let definition = ConfigDefinition::new(db_schema()).with_computed(computed);

        let config: Final = create_config_as(&db_env(), &definition).unwrap();
        assert_eq!(config.db_url, "postgres://localhost");
    }
}
