//! Error types for the envase configuration library.
//!
//! Per-variable failures are never raised on their own: they are collected as
//! [`EnvvarIssue`]s and surfaced together in one [`EnvValidationError`] once
//! the whole schema has been walked. Everything else is a fatal usage error.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use stillwater::{NonEmptyVec, Semigroup};
use thiserror::Error;

/// Header line of every aggregated validation report.
pub const VALIDATION_FAILED_HEADER: &str = "Environment variables validation has failed:";

/// A single environment variable that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvvarIssue {
    /// Environment variable name
    pub name: String,
    /// Raw value as read from the environment, `None` if absent
    pub value: Option<String>,
    /// Messages reported by the validator
    pub messages: Vec<String>,
}

impl EnvvarIssue {
    /// Create a new issue.
    pub fn new(name: impl Into<String>, value: Option<String>, messages: Vec<String>) -> Self {
        Self {
            name: name.into(),
            value,
            messages,
        }
    }
}

impl fmt::Display for EnvvarIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  [{}]:\n    {}\n    (received: \"{}\")",
            self.name,
            self.messages.join("\n    "),
            self.value.as_deref().unwrap_or("undefined")
        )
    }
}

/// Every validation issue found while parsing an environment.
///
/// Uses `NonEmptyVec` from stillwater, so an aggregated error always carries
/// at least one issue.
///
/// # Example
///
/// ```
/// use envase::error::{EnvValidationError, EnvvarIssue};
///
/// let error = EnvValidationError::single(EnvvarIssue::new(
///     "PORT",
///     Some("abc".to_string()),
///     vec!["Must be a number".to_string()],
/// ));
///
/// assert_eq!(
///     error.to_string(),
///     "Environment variables validation has failed:\n  [PORT]:\n    Must be a number\n    (received: \"abc\")\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EnvValidationError(NonEmptyVec<EnvvarIssue>);

impl EnvValidationError {
    /// Create from a non-empty list of issues.
    pub fn new(issues: NonEmptyVec<EnvvarIssue>) -> Self {
        Self(issues)
    }

    /// Create from a single issue.
    pub fn single(issue: EnvvarIssue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Try to create from a vec, returning None if empty.
    pub fn from_vec(issues: Vec<EnvvarIssue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    /// Get the first issue (always exists).
    pub fn first(&self) -> &EnvvarIssue {
        self.0.head()
    }

    /// Iterate over issues in traversal order.
    pub fn issues(&self) -> impl Iterator<Item = &EnvvarIssue> {
        self.0.iter()
    }

    /// Names of the failing variables in traversal order.
    pub fn names(&self) -> Vec<&str> {
        self.issues().map(|issue| issue.name.as_str()).collect()
    }

    /// Number of issues.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty (always false, but required for API consistency).
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `error`, or any error in its `source()` chain, is an
    /// aggregated validation failure.
    ///
    /// Recognises both a bare `EnvValidationError` and one carried by
    /// [`EnvError::Validation`], so callers holding a `Box<dyn Error>` from
    /// further up the stack can still tell "bad configuration" apart from
    /// every other failure.
    pub fn is_instance(error: &(dyn StdError + 'static)) -> bool {
        let mut current = Some(error);
        while let Some(err) = current {
            if err.is::<EnvValidationError>() {
                return true;
            }
            if let Some(EnvError::Validation(_)) = err.downcast_ref::<EnvError>() {
                return true;
            }
            current = err.source();
        }
        false
    }
}

impl Semigroup for EnvValidationError {
    fn combine(self, other: Self) -> Self {
        Self(self.0.combine(other.0))
    }
}

impl From<EnvvarIssue> for EnvValidationError {
    fn from(issue: EnvvarIssue) -> Self {
        Self::single(issue)
    }
}

impl IntoIterator for EnvValidationError {
    type Item = EnvvarIssue;
    type IntoIter = std::vec::IntoIter<EnvvarIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl fmt::Display for EnvValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", VALIDATION_FAILED_HEADER)?;
        for (index, issue) in self.issues().enumerate() {
            if index > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{}", issue)?;
        }
        writeln!(f)
    }
}

impl StdError for EnvValidationError {}

/// Errors returned by the parse and computed-value engines.
#[derive(Debug, Error)]
pub enum EnvError {
    /// One or more variables failed validation
    #[error(transparent)]
    Validation(#[from] EnvValidationError),

    /// A validator returned a pending result where a synchronous one is required
    #[error("Schema validation for envvar \"{name}\" must be synchronous")]
    AsyncValidation { name: String },

    /// The parsed tree does not fit the requested output type
    #[error("parsed configuration does not match the requested type: {message}")]
    Shape { message: String },

    /// A computed value could not be converted into the configuration tree
    #[error("computed value '{path}' could not be represented: {message}")]
    Computed { path: String, message: String },
}

impl EnvError {
    /// Check if this is an aggregated validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, EnvError::Validation(_))
    }

    /// The aggregated validation failure, if this is one.
    pub fn validation(&self) -> Option<&EnvValidationError> {
        match self {
            EnvError::Validation(error) => Some(error),
            _ => None,
        }
    }
}

/// Errors raised while turning a schema into documentation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A leaf validator exposes no JSON schema description
    #[error("Path \"{path}\" does not contain a valid standard json schema")]
    NotJsonSchema { path: String },

    /// A leaf validator exposes a JSON schema that cannot be read
    #[error("Path \"{path}\" has an unreadable json schema: {message}")]
    InvalidJsonSchema { path: String, message: String },
}

/// Errors raised by the documentation commands.
#[derive(Debug, Error)]
pub enum DocsError {
    /// The schema could not be documented
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A documentation file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A documentation file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issues() -> Vec<EnvvarIssue> {
        vec![
            EnvvarIssue::new(
                "API_KEY",
                Some(String::new()),
                vec![
                    "Required".to_string(),
                    "Must be a non-empty string".to_string(),
                ],
            ),
            EnvvarIssue::new("PORT", Some("abc".to_string()), vec!["Must be a number".to_string()]),
        ]
    }

    #[test]
    fn test_report_format() {
        let error = EnvValidationError::from_vec(sample_issues()).unwrap();

        assert_eq!(
            error.to_string(),
            "Environment variables validation has failed:\n\
             \x20 [API_KEY]:\n\
             \x20   Required\n\
             \x20   Must be a non-empty string\n\
             \x20   (received: \"\")\n\
             \n\
             \x20 [PORT]:\n\
             \x20   Must be a number\n\
             \x20   (received: \"abc\")\n"
        );
    }

    #[test]
    fn test_absent_value_renders_undefined() {
        let error = EnvValidationError::single(EnvvarIssue::new(
            "DB_HOST",
            None,
            vec!["Required".to_string()],
        ));
        assert!(error.to_string().contains("(received: \"undefined\")"));
    }

    #[test]
    fn test_issues_are_kept_in_order() {
        let error = EnvValidationError::from_vec(sample_issues()).unwrap();
        assert_eq!(error.len(), 2);
        assert_eq!(error.names(), vec!["API_KEY", "PORT"]);
        assert_eq!(error.first().name, "API_KEY");
        assert_eq!(error.into_iter().collect::<Vec<_>>(), sample_issues());
    }

    #[test]
    fn test_from_vec_rejects_empty() {
        assert!(EnvValidationError::from_vec(Vec::new()).is_none());
    }

    #[test]
    fn test_combine() {
        let mut issues = sample_issues();
        let second = EnvValidationError::single(issues.pop().unwrap());
        let first = EnvValidationError::single(issues.pop().unwrap());

        let combined = first.combine(second);
        assert_eq!(combined.names(), vec!["API_KEY", "PORT"]);
    }

    #[test]
    fn test_is_instance() {
        let error = EnvValidationError::from_vec(sample_issues()).unwrap();
        assert!(EnvValidationError::is_instance(&error));

        let wrapped = EnvError::from(error);
        assert!(EnvValidationError::is_instance(&wrapped));

        let boxed: Box<dyn StdError + 'static> = Box::new(wrapped);
        assert!(EnvValidationError::is_instance(boxed.as_ref()));
    }

    #[test]
    fn test_is_instance_rejects_other_errors() {
        let io_error = io::Error::new(io::ErrorKind::Other, "Oops");
        assert!(!EnvValidationError::is_instance(&io_error));

        let async_error = EnvError::AsyncValidation {
            name: "PORT".to_string(),
        };
        assert!(!EnvValidationError::is_instance(&async_error));
        assert!(!async_error.is_validation());
    }

    #[test]
    fn test_is_instance_follows_source_chain() {
        #[derive(Debug, Error)]
        #[error("startup failed")]
        struct Startup(#[source] EnvError);

        let error = EnvValidationError::from_vec(sample_issues()).unwrap();
        let startup = Startup(EnvError::from(error));
        assert!(EnvValidationError::is_instance(&startup));
    }

    #[test]
    fn test_async_validation_message() {
        let error = EnvError::AsyncValidation {
            name: "PORT".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Schema validation for envvar \"PORT\" must be synchronous"
        );
    }

    #[test]
    fn test_schema_error_message() {
        let error = SchemaError::NotJsonSchema {
            path: "port".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Path \"port\" does not contain a valid standard json schema"
        );
    }
}
