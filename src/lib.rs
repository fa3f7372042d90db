//! Envase: typed, nested configuration from environment variables.
//!
//! Declare which environment variables your application needs as a nested
//! schema, bind each one to a validator, and parse the process environment
//! into a configuration tree in one step. Every broken variable is reported
//! at once, so a misconfigured deployment is fixed in one round trip instead
//! of one variable at a time.
//!
//! # Core Concepts
//!
//! - **Schema Tree**: nested groups of `envvar(NAME, validator)` bindings
//! - **Error Accumulation**: find ALL invalid variables, not just the first one
//! - **Pluggable Validators**: anything implementing [`StandardSchema`]
//! - **Computed Values**: derive fields from the parsed tree and merge them back in
//! - **Generated Docs**: render the schema as markdown and detect drift in CI
//! - **Testable I/O**: dependency injection via the `ConfigEnv` trait
//!
//! # Quick Start
//!
//! ```
//! use envase::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Db {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct AppConfig {
//!     db: Db,
//!     db_url: String,
//! }
//!
//! let schema = env_schema! {
//!     db: {
//!         host: envvar("DB_HOST", string().non_empty()),
//!         port: envvar("DB_PORT", number::<u16>().with_default(5432)),
//!     },
//! };
//!
//! let env = MockEnv::new().with_env("DB_HOST", "localhost");
//!
//! let config = Config::<AppConfig>::builder()
//!     .schema(schema)
//!     .computed(ComputedSchema::new().field("db_url", |raw: &Value| {
//!         format!(
//!             "postgres://{}:{}",
//!             raw.get_path("db.host").and_then(Value::as_str).unwrap_or_default(),
//!             raw.get_path("db.port").and_then(Value::as_integer).unwrap_or_default(),
//!         )
//!     }))
//!     .build_with_env(&env)
//!     .unwrap();
//!
//! assert_eq!(config.db_url, "postgres://localhost:5432");
//! ```
//!
//! # Error Reporting
//!
//! All invalid variables are reported together:
//!
//! ```text
//! Environment variables validation has failed:
//!   [DB_HOST]:
//!     Required
//!     (received: "undefined")
//!
//!   [DB_PORT]:
//!     Expected integer, received "abc"
//!     (received: "abc")
//! ```
//!
//! A validator that can only answer asynchronously is a usage error and
//! aborts the parse with [`EnvError::AsyncValidation`] instead.
//!
//! # Architecture
//!
//! Envase follows the "pure core, imperative shell" pattern:
//!
//! - **Pure Core**: tree walking, error aggregation, deep merging and markdown
//!   rendering are pure functions
//! - **Imperative Shell**: I/O operations use the `ConfigEnv` trait for dependency injection
//!
//! # Module Structure
//!
//! - [`prelude`]: Convenient re-exports for common usage
//! - [`standard`]: the `StandardSchema` validator contract
//! - [`validators`]: built-in validators and combinators
//! - [`schema`]: `EnvSchema` tree and the `env_schema!` macro
//! - [`parse`]: `parse_env`, the validation engine
//! - [`computed`]: computed values and `create_config`
//! - [`config`]: `Config` and `ConfigBuilder` for typed loading
//! - [`error`]: Error types (`EnvValidationError`, `EnvError`, `SchemaError`)
//! - [`value`]: `Value` tree produced by parsing
//! - [`mod@env`]: `ConfigEnv` trait and `MockEnv` for testing
//! - [`mode`]: runtime mode flags from `NODE_ENV`
//! - [`docs`]: markdown generation and drift detection
//! - `cli`: clap commands for the docs layer (feature `cli`)
//!
//! # Stillwater Integration
//!
//! | Type | Usage |
//! |------|-------|
//! | `Validation<T, E>` | Synchronous validator outcomes |
//! | `NonEmptyVec<T>` | Guaranteed non-empty issue lists |
//! | `Semigroup` | Combining validation reports |
//!
//! These are re-exported from the prelude for convenience.

pub mod computed;
pub mod config;
pub mod docs;
pub mod env;
pub mod error;
pub mod mode;
pub mod parse;
pub mod prelude;
pub mod schema;
pub mod standard;
pub mod validators;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export main types at crate root for convenience
pub use computed::{create_config, create_config_as, ComputedSchema, ConfigDefinition};
pub use config::{Config, ConfigBuilder};
pub use env::{ConfigEnv, MockEnv, RealEnv};
pub use error::{DocsError, EnvError, EnvValidationError, EnvvarIssue, SchemaError};
pub use mode::{detect_runtime_mode, RuntimeMode};
pub use parse::{parse_env, parse_env_as};
pub use schema::{envvar, EnvSchema, EnvVar, SchemaNode};
pub use standard::{Issue, StandardResult, StandardSchema};
pub use value::Value;

// Re-export stillwater types for convenience
pub use stillwater::{NonEmptyVec, Semigroup, Validation};
