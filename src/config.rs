//! Core Config type and ConfigBuilder.
//!
//! This module provides the typed entry point for loading configuration from
//! environment variables using the builder pattern. The builder collects a
//! schema and optional computed values, then parses, merges and deserializes
//! into the application's own configuration struct.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::computed::{create_config_as, ComputedSchema, ConfigDefinition};
use crate::env::{ConfigEnv, RealEnv};
use crate::error::EnvError;
use crate::schema::EnvSchema;
use crate::value::Value;

/// Wrapper around a validated configuration value.
///
/// This type ensures that the configuration has been loaded and validated.
/// It implements `Deref` to provide transparent access to the inner type.
#[derive(Debug, Clone)]
pub struct Config<T> {
    inner: T,
}

impl<T> Config<T> {
    /// Create a new Config wrapping an already-validated value.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Get a reference to the inner configuration value.
    pub fn get(&self) -> &T {
        &self.inner
    }

    /// Consume this Config and return the inner value.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Create a builder for this configuration type.
    pub fn builder() -> ConfigBuilder<T> {
        ConfigBuilder::new()
    }
}

impl<T> std::ops::Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> AsRef<T> for Config<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

/// Builder for loading and validating configuration.
///
/// `T` is the final configuration type. `R` is the shape computed functions
/// receive, the untyped [`Value`] tree unless [`ConfigBuilder::computed`] is
/// given functions over a typed struct.
///
/// # Example
///
/// ```
/// use envase::{env_schema, envvar, Config, Value};
/// use envase::computed::ComputedSchema;
/// use envase::env::MockEnv;
/// use envase::validators::{number, string};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Db {
///     host: String,
///     port: u16,
/// }
///
/// #[derive(Deserialize)]
/// struct AppConfig {
///     db: Db,
///     db_url: String,
/// }
///
/// let env = MockEnv::new()
///     .with_env("DB_HOST", "localhost")
///     .with_env("DB_PORT", "5432");
///
/// let config = Config::<AppConfig>::builder()
///     .schema(env_schema! {
///         db: {
///             host: envvar("DB_HOST", string()),
///             port: envvar("DB_PORT", number::<u16>()),
///         },
///     })
///     .computed(ComputedSchema::new().field("db_url", |raw: &Value| {
///         format!(
///             "postgres://{}:{}",
///             raw.get_path("db.host").and_then(Value::as_str).unwrap_or_default(),
///             raw.get_path("db.port").and_then(Value::as_integer).unwrap_or_default(),
///         )
///     }))
///     .build_with_env(&env)
///     .unwrap();
///
/// assert_eq!(config.db.port, 5432);
/// assert_eq!(config.db_url, "postgres://localhost:5432");
/// ```
pub struct ConfigBuilder<T, R = Value> {
    schema: EnvSchema,
    computed: Option<ComputedSchema<R>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for ConfigBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigBuilder<T> {
    /// Create a new builder with an empty schema.
    pub fn new() -> Self {
        Self {
            schema: EnvSchema::new(),
            computed: None,
            _marker: PhantomData,
        }
    }
}

impl<T, R> ConfigBuilder<T, R> {
    /// Set the environment schema.
    ///
    /// Calling this again replaces the previous schema.
    pub fn schema(mut self, schema: EnvSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Set the computed values, fixing the raw shape they are computed from.
    pub fn computed<R2>(self, computed: ComputedSchema<R2>) -> ConfigBuilder<T, R2> {
        ConfigBuilder {
            schema: self.schema,
            computed: Some(computed),
            _marker: PhantomData,
        }
    }

    /// Turn the builder into a reusable definition.
    pub fn definition(self) -> ConfigDefinition<R> {
        let definition = ConfigDefinition::new(self.schema);
        match self.computed {
            Some(computed) => definition.with_computed(computed),
            None => definition,
        }
    }

    /// Build the configuration using the real environment.
    ///
    /// This is the main entry point for production use.
    pub fn build(self) -> Result<Config<T>, EnvError>
    where
        T: DeserializeOwned,
        R: DeserializeOwned,
    {
        self.build_with_env(&RealEnv::new())
    }

    /// Build the configuration with a custom environment.
    ///
    /// This enables dependency injection for testing.
    pub fn build_with_env(self, env: &dyn ConfigEnv) -> Result<Config<T>, EnvError>
    where
        T: DeserializeOwned,
        R: DeserializeOwned,
    {
        let definition = self.definition();
        create_config_as::<R, T>(env, &definition).map(Config::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;
    use crate::schema::envvar;
    use crate::validators::{boolean, number, string, StandardSchemaExt};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct SimpleConfig {
        host: String,
        port: u16,
    }

    fn simple_schema() -> EnvSchema {
        EnvSchema::new()
            .var("host", envvar("APP_HOST", string()))
            .var("port", envvar("APP_PORT", number::<u16>().with_default(8080)))
    }

    #[test]
    fn test_build_with_env() {
        let env = MockEnv::new()
            .with_env("APP_HOST", "localhost")
            .with_env("APP_PORT", "3000");

        let config = Config::<SimpleConfig>::builder()
            .schema(simple_schema())
            .build_with_env(&env)
            .unwrap();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.get().port, 3000);
        assert_eq!(
            config.into_inner(),
            SimpleConfig {
                host: "localhost".to_string(),
                port: 3000
            }
        );
    }

    #[test]
    fn test_build_applies_defaults() {
        let env = MockEnv::new().with_env("APP_HOST", "example.com");

        let config = Config::<SimpleConfig>::builder()
            .schema(simple_schema())
            .build_with_env(&env)
            .unwrap();

        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_build_reports_validation_errors() {
        let env = MockEnv::new().with_env("APP_PORT", "not-a-port");

        let result = Config::<SimpleConfig>::builder()
            .schema(simple_schema())
            .build_with_env(&env);

        let error = result.unwrap_err();
        assert_eq!(error.validation().unwrap().names(), vec!["APP_HOST", "APP_PORT"]);
    }

    #[test]
    fn test_build_with_typed_computed() {
        #[derive(Deserialize)]
        struct Raw {
            host: String,
            port: u16,
        }

        #[derive(Debug, Deserialize)]
        struct WithAddress {
            port: u16,
            address: String,
            secure: bool,
        }

        let env = MockEnv::new()
            .with_env("APP_HOST", "example.com")
            .with_env("APP_SECURE", "true");

        let config = Config::<WithAddress>::builder()
            .schema(simple_schema().var("secure", envvar("APP_SECURE", boolean())))
            .computed(
                ComputedSchema::<Raw>::new()
                    .field("address", |raw: &Raw| format!("{}:{}", raw.host, raw.port)),
            )
            .build_with_env(&env)
            .unwrap();

        assert_eq!(config.address, "example.com:8080");
        assert_eq!(config.port, 8080);
        assert!(config.secure);
    }

    #[test]
    fn test_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct NeedsMore {
            host: String,
            missing: String,
        }

        let env = MockEnv::new().with_env("APP_HOST", "localhost");
        let result = Config::<NeedsMore>::builder()
            .schema(simple_schema())
            .build_with_env(&env);

        assert!(matches!(result, Err(EnvError::Shape { .. })));
    }

    #[test]
    fn test_empty_builder_builds_unit_like_config() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Empty {}

        let config = Config::<Empty>::builder()
            .build_with_env(&MockEnv::new())
            .unwrap();
        assert_eq!(*config, Empty {});
    }

    #[test]
    fn test_definition_round_trip() {
        let definition = Config::<SimpleConfig>::builder()
            .schema(simple_schema())
            .definition();

        assert_eq!(definition.schema().env_names(), vec!["APP_HOST", "APP_PORT"]);
        assert!(definition.computed().is_none());
    }
}
