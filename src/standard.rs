//! The validation contract every leaf validator must satisfy.
//!
//! A [`StandardSchema`] takes the raw environment value (`None` when the
//! variable is absent) and answers synchronously with either a typed value or
//! a list of [`Issue`]s. Any validation library can be plugged in by
//! implementing this one trait; see [`crate::validators`] for the adapters
//! that ship with the crate.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use stillwater::Validation;

use crate::value::Value;

/// A single reason a raw value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Human-readable message
    pub message: String,
}

impl Issue {
    /// Create an issue with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for Issue {
    fn from(message: &str) -> Self {
        Issue::new(message)
    }
}

impl From<String> for Issue {
    fn from(message: String) -> Self {
        Issue::new(message)
    }
}

/// Synchronous outcome of a validator.
pub type StandardValidation<T> = Validation<T, Vec<Issue>>;

/// Deferred outcome of an asynchronous validator.
pub type PendingValidation<T> = Pin<Box<dyn Future<Output = StandardValidation<T>> + Send>>;

/// What a validator hands back.
///
/// The parse engine only accepts [`StandardResult::Ready`]; a
/// [`StandardResult::Pending`] result aborts the whole parse.
pub enum StandardResult<T> {
    /// The validator finished synchronously
    Ready(StandardValidation<T>),
    /// The validator needs an executor to finish
    Pending(PendingValidation<T>),
}

impl<T> StandardResult<T> {
    /// Successful synchronous result.
    pub fn success(value: T) -> Self {
        StandardResult::Ready(Validation::Success(value))
    }

    /// Failed synchronous result.
    pub fn failure(issues: Vec<Issue>) -> Self {
        StandardResult::Ready(Validation::Failure(issues))
    }

    /// Failed synchronous result with one message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::failure(vec![Issue::new(message)])
    }

    /// Wrap a future as a pending result.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = StandardValidation<T>> + Send + 'static,
    {
        StandardResult::Pending(Box::pin(future))
    }

    /// Check if this result is still pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, StandardResult::Pending(_))
    }

    /// Check if this result is a synchronous success.
    pub fn is_success(&self) -> bool {
        matches!(self, StandardResult::Ready(Validation::Success(_)))
    }

    /// Map the success value, keeping pending results pending.
    pub fn map<U, F>(self, f: F) -> StandardResult<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
        T: 'static,
        U: 'static,
    {
        match self {
            StandardResult::Ready(validation) => StandardResult::Ready(validation.map(f)),
            StandardResult::Pending(future) => {
                StandardResult::Pending(Box::pin(async move { future.await.map(f) }))
            }
        }
    }
}

impl<T> From<StandardValidation<T>> for StandardResult<T> {
    fn from(validation: StandardValidation<T>) -> Self {
        StandardResult::Ready(validation)
    }
}

impl<T: fmt::Debug> fmt::Debug for StandardResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandardResult::Ready(validation) => f.debug_tuple("Ready").field(validation).finish(),
            StandardResult::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A validator usable as the right-hand side of an envvar binding.
///
/// # Example
///
/// ```
/// use envase::standard::{StandardResult, StandardSchema};
///
/// struct Port;
///
/// impl StandardSchema for Port {
///     type Output = u16;
///
///     fn validate(&self, input: Option<&str>) -> StandardResult<u16> {
///         match input.map(str::parse::<u16>) {
///             Some(Ok(port)) => StandardResult::success(port),
///             Some(Err(_)) => StandardResult::fail("Must be a port number"),
///             None => StandardResult::fail("Required"),
///         }
///     }
/// }
///
/// assert!(Port.validate(Some("8080")).is_success());
/// assert!(!Port.validate(None).is_success());
/// ```
pub trait StandardSchema: Send + Sync {
    /// Type produced on success.
    type Output;

    /// Validate a raw environment value; `None` means the variable is absent.
    fn validate(&self, input: Option<&str>) -> StandardResult<Self::Output>;

    /// JSON-Schema description used for documentation, if the validator has one.
    fn json_schema(&self) -> Option<serde_json::Value> {
        None
    }
}

impl<S: StandardSchema + ?Sized> StandardSchema for Box<S> {
    type Output = S::Output;

    fn validate(&self, input: Option<&str>) -> StandardResult<Self::Output> {
        (**self).validate(input)
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        (**self).json_schema()
    }
}

impl<S: StandardSchema + ?Sized> StandardSchema for std::sync::Arc<S> {
    type Output = S::Output;

    fn validate(&self, input: Option<&str>) -> StandardResult<Self::Output> {
        (**self).validate(input)
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        (**self).json_schema()
    }
}

/// Type-erased outcome used by the parse engine.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Checked {
    Valid(Value),
    Invalid(Vec<String>),
    Pending,
}

/// Object-safe view of a [`StandardSchema`] whose output is serializable.
pub(crate) trait ErasedSchema: Send + Sync {
    fn check(&self, input: Option<&str>) -> Checked;

    fn json_schema(&self) -> Option<serde_json::Value>;
}

impl<S> ErasedSchema for S
where
    S: StandardSchema,
    S::Output: Serialize,
{
    fn check(&self, input: Option<&str>) -> Checked {
        match self.validate(input) {
            StandardResult::Pending(_) => Checked::Pending,
            StandardResult::Ready(Validation::Failure(issues)) => {
                Checked::Invalid(issues.into_iter().map(|issue| issue.message).collect())
            }
            StandardResult::Ready(Validation::Success(output)) => match Value::from_serialize(&output)
            {
                Ok(value) => Checked::Valid(value),
                Err(err) => Checked::Invalid(vec![format!("value could not be represented: {}", err)]),
            },
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        StandardSchema::json_schema(self)
    }
}

/// The `type` keyword of a JSON schema: one name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Many(Vec<String>),
}

/// The subset of JSON Schema the documentation generator understands.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchemaDoc {
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    pub description: Option<String>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    pub default: Option<serde_json::Value>,
    pub minimum: Option<serde_json::Value>,
    pub maximum: Option<serde_json::Value>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub format: Option<String>,
    pub any_of: Option<Vec<JsonSchemaDoc>>,
}

impl JsonSchemaDoc {
    /// Decode a JSON schema document.
    pub fn from_json(json: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json)
    }

    /// Type names declared by this schema, falling back to its `anyOf` members.
    pub fn type_names(&self) -> Vec<String> {
        match &self.schema_type {
            Some(SchemaType::Single(name)) => vec![name.clone()],
            Some(SchemaType::Many(names)) => names.clone(),
            None => {
                let mut names: Vec<String> = Vec::new();
                for member in self.any_of.iter().flatten() {
                    for name in member.type_names() {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                names
            }
        }
    }
}
