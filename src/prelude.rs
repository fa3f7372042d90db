//! Convenient re-exports for common envase usage.
//!
//! # Quick Start
//!
//! ```
//! use envase::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let env = MockEnv::new().with_env("APP_HOST", "localhost");
//!
//! let config = Config::<AppConfig>::builder()
//!     .schema(env_schema! {
//!         host: envvar("APP_HOST", string()),
//!         port: envvar("APP_PORT", number::<u16>().with_default(8080)),
//!     })
//!     .build_with_env(&env)
//!     .unwrap();
//!
//! assert_eq!(config.port, 8080);
//! ```
//!
//! # Import Patterns
//!
//! ## Quick Start (Recommended)
//!
//! ```
//! use envase::prelude::*;
//! ```
//!
//! ## Selective Imports
//!
//! Import only what you need:
//!
//! ```
//! use envase::{envvar, parse_env, EnvSchema};
//! use envase::error::EnvValidationError;
//! ```

// ============================================================================
// Stillwater re-exports
// ============================================================================

/// Synchronous validator outcome. Custom validators return
/// `Validation::Success(value)` or `Validation::Failure(issues)`.
pub use stillwater::Validation;

/// Trait for combining values. `EnvValidationError` implements this so
/// reports from several parses can be merged.
pub use stillwater::Semigroup;

/// Guaranteed non-empty collection. Underlying type for `EnvValidationError`.
pub use stillwater::NonEmptyVec;

// ============================================================================
// Error types
// ============================================================================

/// One failing environment variable: name, raw value and messages.
pub use crate::error::EnvvarIssue;

/// Every failing variable of a parse, reported together.
pub use crate::error::EnvValidationError;

/// Errors returned by parsing and configuration building.
pub use crate::error::EnvError;

/// Errors raised while documenting a schema.
pub use crate::error::{DocsError, SchemaError};

// ============================================================================
// Schema and validators
// ============================================================================

pub use crate::schema::{envvar, EnvSchema, EnvVar, SchemaNode};

pub use crate::standard::{Issue, StandardResult, StandardSchema};

pub use crate::validators::{
    boolean, from_fn, number, one_of, parse, string, StandardSchemaExt,
};

// ============================================================================
// Parsing and configuration
// ============================================================================

/// The main configuration container wrapping validated config.
///
/// Use `Config::builder()` to construct configuration from a schema.
pub use crate::config::{Config, ConfigBuilder};

pub use crate::computed::{create_config, ComputedSchema, ConfigDefinition};

pub use crate::parse::{parse_env, parse_env_as};

pub use crate::value::Value;

pub use crate::mode::{detect_runtime_mode, RuntimeMode};

// ============================================================================
// Testing utilities
// ============================================================================

/// Trait for environment access. Enables dependency injection.
pub use crate::env::ConfigEnv;

/// Mock environment for testing. Provides in-memory env vars and files.
pub use crate::env::MockEnv;

/// Real environment implementation using `std::env` and `std::fs`.
pub use crate::env::RealEnv;

pub use crate::env_schema;
