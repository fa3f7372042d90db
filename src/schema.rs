//! The schema tree: which environment variables exist and how they nest.
//!
//! A schema is an insertion-ordered mapping from keys to either a leaf
//! binding ([`EnvVar`], an environment variable name plus its validator) or a
//! nested [`EnvSchema`]. The same tree drives parsing and documentation.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::standard::{Checked, ErasedSchema, StandardSchema};

/// A leaf binding: one environment variable and the validator for its value.
#[derive(Clone)]
pub struct EnvVar {
    name: String,
    schema: Arc<dyn ErasedSchema>,
}

/// Bind the environment variable `name` to a validator.
///
/// # Example
///
/// ```
/// use envase::{envvar, validators::number};
///
/// let port = envvar("PORT", number::<u16>());
/// assert_eq!(port.name(), "PORT");
/// ```
pub fn envvar<S>(name: impl Into<String>, schema: S) -> EnvVar
where
    S: StandardSchema + 'static,
    S::Output: Serialize,
{
    EnvVar {
        name: name.into(),
        schema: Arc::new(schema),
    }
}

impl EnvVar {
    /// Environment variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// JSON-Schema description exposed by the validator, if any.
    pub fn json_schema(&self) -> Option<serde_json::Value> {
        self.schema.json_schema()
    }

    /// Whether the variable must be present.
    ///
    /// A variable is optional when its validator accepts an absent value,
    /// either because it is optional or because it has a default.
    pub fn is_required(&self) -> bool {
        !matches!(self.schema.check(None), Checked::Valid(_))
    }

    pub(crate) fn check(&self, input: Option<&str>) -> Checked {
        self.schema.check(input)
    }
}

impl fmt::Debug for EnvVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVar").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A node of the schema tree.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// Leaf binding to an environment variable
    Var(EnvVar),
    /// Nested group of nodes
    Group(EnvSchema),
}

impl From<EnvVar> for SchemaNode {
    fn from(var: EnvVar) -> Self {
        SchemaNode::Var(var)
    }
}

impl From<EnvSchema> for SchemaNode {
    fn from(schema: EnvSchema) -> Self {
        SchemaNode::Group(schema)
    }
}

/// A nested declaration of environment variables.
///
/// Keys keep insertion order. Inserting an existing key replaces its node in
/// place, so a key is always either a leaf or a group, never both.
///
/// # Example
///
/// ```
/// use envase::{envvar, EnvSchema};
/// use envase::validators::{number, string};
///
/// let schema = EnvSchema::new()
///     .var("port", envvar("PORT", number::<u16>()))
///     .group(
///         "db",
///         EnvSchema::new().var("host", envvar("DB_HOST", string())),
///     );
///
/// assert_eq!(schema.env_names(), vec!["PORT", "DB_HOST"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSchema {
    entries: IndexMap<String, SchemaNode>,
}

impl EnvSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `key`.
    pub fn entry(mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        self.insert(key, node);
        self
    }

    /// Add a leaf binding under `key`.
    pub fn var(self, key: impl Into<String>, var: EnvVar) -> Self {
        self.entry(key, var)
    }

    /// Add a nested group under `key`.
    pub fn group(self, key: impl Into<String>, group: EnvSchema) -> Self {
        self.entry(key, group)
    }

    /// Insert a node in place, returning the node previously stored at `key`.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<SchemaNode>) -> Option<SchemaNode> {
        self.entries.insert(key.into(), node.into())
    }

    /// Get a direct child node.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        self.entries.get(key)
    }

    /// Iterate over direct children in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SchemaNode)> {
        self.entries.iter()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the schema has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All leaf bindings, depth-first in declaration order.
    pub fn vars(&self) -> Vec<&EnvVar> {
        let mut vars = Vec::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars<'a>(&'a self, out: &mut Vec<&'a EnvVar>) {
        for node in self.entries.values() {
            match node {
                SchemaNode::Var(var) => out.push(var),
                SchemaNode::Group(group) => group.collect_vars(out),
            }
        }
    }

    /// Environment variable names, depth-first in declaration order.
    pub fn env_names(&self) -> Vec<&str> {
        self.vars().into_iter().map(EnvVar::name).collect()
    }

    /// Total number of leaf bindings at any depth.
    pub fn leaf_count(&self) -> usize {
        self.entries
            .values()
            .map(|node| match node {
                SchemaNode::Var(_) => 1,
                SchemaNode::Group(group) => group.leaf_count(),
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a EnvSchema {
    type Item = (&'a String, &'a SchemaNode);
    type IntoIter = indexmap::map::Iter<'a, String, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Declare an [`EnvSchema`] as a nested literal.
///
/// Each entry is `key: <EnvVar expression>` or `key: { ...nested entries... }`.
///
/// # Example
///
/// ```
/// use envase::{env_schema, envvar};
/// use envase::validators::{number, string, StandardSchemaExt};
///
/// let schema = env_schema! {
///     port: envvar("PORT", number::<u16>()),
///     db: {
///         host: envvar("DB_HOST", string()),
///         port: envvar("DB_PORT", number::<u16>().with_default(5432)),
///     },
/// };
///
/// assert_eq!(schema.leaf_count(), 3);
/// assert_eq!(schema.env_names(), vec!["PORT", "DB_HOST", "DB_PORT"]);
/// ```
#[macro_export]
macro_rules! env_schema {
    (@entries $schema:ident ;) => {};
    (@entries $schema:ident ; $key:ident : { $($inner:tt)* } $(, $($rest:tt)*)?) => {
        $schema = $schema.group(stringify!($key), $crate::env_schema! { $($inner)* });
        $crate::env_schema!(@entries $schema ; $($($rest)*)?);
    };
    (@entries $schema:ident ; $key:ident : $var:expr $(, $($rest:tt)*)?) => {
        $schema = $schema.var(stringify!($key), $var);
        $crate::env_schema!(@entries $schema ; $($($rest)*)?);
    };
    ($($body:tt)*) => {{
        #[allow(unused_mut)]
        let mut schema = $crate::EnvSchema::new();
        $crate::env_schema!(@entries schema ; $($body)*);
        schema
    }};
}
