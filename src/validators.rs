//! Built-in [`StandardSchema`] adapters.
//!
//! These cover the common shapes of environment values: strings with length
//! and pattern constraints, numbers with bounds, booleans, enumerations and
//! anything implementing `FromStr`. Each adapter also describes itself as JSON
//! Schema so it can be documented. Constraint violations are accumulated, so
//! one variable can report several messages at once.
//!
//! # Example
//!
//! ```
//! use envase::validators::{number, one_of, string, StandardSchemaExt};
//!
//! let port = number::<u16>().min(1024).describe("Listening port");
//! let level = one_of(["debug", "info", "warn"]).with_default("info".to_string());
//! let name = string().min_len(3).optional();
//! # let _ = (port, level, name);
//! ```

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map};
use stillwater::Validation;

use crate::standard::{Issue, StandardResult, StandardSchema, StandardValidation};

/// Message reported when a required variable is absent.
pub const REQUIRED_MESSAGE: &str = "Required";

fn schema_object(json: serde_json::Value) -> Map<String, serde_json::Value> {
    match json {
        serde_json::Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn finish<T>(value: T, issues: Vec<Issue>) -> StandardResult<T> {
    if issues.is_empty() {
        StandardResult::success(value)
    } else {
        StandardResult::failure(issues)
    }
}

// ============================================================================
// Strings
// ============================================================================

#[derive(Debug, Clone)]
enum StringConstraint {
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
}

/// A schema for string values.
#[derive(Debug, Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    format: Option<String>,
}

/// Accept any present string, optionally constrained.
pub fn string() -> StringSchema {
    StringSchema {
        constraints: Vec::new(),
        format: None,
    }
}

impl StringSchema {
    /// Require at least `min` characters.
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints.push(StringConstraint::MinLength(min));
        self
    }

    /// Require at most `max` characters.
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints.push(StringConstraint::MaxLength(max));
        self
    }

    /// Reject the empty string.
    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// Require the value to match a regex.
    ///
    /// Returns an error if the pattern is not a valid regex.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        self.constraints.push(StringConstraint::Pattern(regex));
        Ok(self)
    }

    /// Tag the value with a JSON-Schema format (`uri`, `email`, ...).
    ///
    /// The tag is documentation only; no format checking is performed.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    fn check(&self, value: &str) -> Vec<Issue> {
        let length = value.chars().count();
        self.constraints
            .iter()
            .filter_map(|constraint| match constraint {
                StringConstraint::MinLength(min) if length < *min => Some(Issue::new(format!(
                    "Must be at least {} characters long",
                    min
                ))),
                StringConstraint::MaxLength(max) if length > *max => Some(Issue::new(format!(
                    "Must be at most {} characters long",
                    max
                ))),
                StringConstraint::Pattern(regex) if !regex.is_match(value) => Some(Issue::new(
                    format!("Must match pattern {}", regex.as_str()),
                )),
                _ => None,
            })
            .collect()
    }
}

impl StandardSchema for StringSchema {
    type Output = String;

    fn validate(&self, input: Option<&str>) -> StandardResult<String> {
        match input {
            None => StandardResult::fail(REQUIRED_MESSAGE),
            Some(value) => finish(value.to_string(), self.check(value)),
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        let mut schema = schema_object(json!({ "type": "string" }));
        for constraint in &self.constraints {
            match constraint {
                StringConstraint::MinLength(min) => schema.insert("minLength".into(), json!(min)),
                StringConstraint::MaxLength(max) => schema.insert("maxLength".into(), json!(max)),
                StringConstraint::Pattern(regex) => {
                    schema.insert("pattern".into(), json!(regex.as_str()))
                }
            };
        }
        if let Some(format) = &self.format {
            schema.insert("format".into(), json!(format));
        }
        Some(serde_json::Value::Object(schema))
    }
}

// ============================================================================
// Numbers
// ============================================================================

/// Numeric types that can be read from an environment variable.
pub trait Numeric:
    FromStr + PartialOrd + Copy + Display + Serialize + Send + Sync + 'static
{
    /// JSON-Schema type name (`integer` or `number`).
    const JSON_TYPE: &'static str;

    /// JSON representation used in schema bounds.
    fn to_json(self) -> serde_json::Value;

    /// False for NaN and infinities.
    fn finite(self) -> bool {
        true
    }
}

macro_rules! impl_numeric {
    (integer => $($t:ty),*) => {
        $(
            impl Numeric for $t {
                const JSON_TYPE: &'static str = "integer";

                fn to_json(self) -> serde_json::Value {
                    serde_json::Value::from(self)
                }
            }
        )*
    };
    (float => $($t:ty),*) => {
        $(
            impl Numeric for $t {
                const JSON_TYPE: &'static str = "number";

                fn to_json(self) -> serde_json::Value {
                    serde_json::Value::from(self)
                }

                fn finite(self) -> bool {
                    self.is_finite()
                }
            }
        )*
    };
}

impl_numeric!(integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_numeric!(float => f32, f64);

/// A schema for numeric values, parsed from their decimal text.
#[derive(Debug, Clone)]
pub struct NumberSchema<T> {
    min: Option<T>,
    max: Option<T>,
}

/// Parse the value as a number of type `T`.
///
/// Surrounding whitespace is ignored. Float types reject `NaN` and infinities.
pub fn number<T: Numeric>() -> NumberSchema<T> {
    NumberSchema {
        min: None,
        max: None,
    }
}

impl<T: Numeric> NumberSchema<T> {
    /// Inclusive lower bound.
    pub fn min(mut self, min: T) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: T) -> Self {
        self.max = Some(max);
        self
    }
}

impl<T: Numeric> StandardSchema for NumberSchema<T> {
    type Output = T;

    fn validate(&self, input: Option<&str>) -> StandardResult<T> {
        let Some(raw) = input else {
            return StandardResult::fail(REQUIRED_MESSAGE);
        };
        let Some(value) = raw.trim().parse::<T>().ok().filter(|v| v.finite()) else {
            return StandardResult::fail(format!(
                "Expected {}, received \"{}\"",
                T::JSON_TYPE,
                raw
            ));
        };

        let mut issues = Vec::new();
        if let Some(min) = self.min.filter(|min| value < *min) {
            issues.push(Issue::new(format!("Must be greater than or equal to {}", min)));
        }
        if let Some(max) = self.max.filter(|max| value > *max) {
            issues.push(Issue::new(format!("Must be less than or equal to {}", max)));
        }
        finish(value, issues)
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        let mut schema = schema_object(json!({ "type": T::JSON_TYPE }));
        if let Some(min) = self.min {
            schema.insert("minimum".into(), min.to_json());
        }
        if let Some(max) = self.max {
            schema.insert("maximum".into(), max.to_json());
        }
        Some(serde_json::Value::Object(schema))
    }
}

// ============================================================================
// Booleans
// ============================================================================

/// A schema for boolean flags (`true`/`false`/`1`/`0`, case-insensitive).
#[derive(Debug, Clone, Copy)]
pub struct BoolSchema;

/// Parse the value as a boolean flag.
pub fn boolean() -> BoolSchema {
    BoolSchema
}

impl StandardSchema for BoolSchema {
    type Output = bool;

    fn validate(&self, input: Option<&str>) -> StandardResult<bool> {
        match input.map(|raw| raw.trim().to_ascii_lowercase()) {
            None => StandardResult::fail(REQUIRED_MESSAGE),
            Some(flag) if flag == "true" || flag == "1" => StandardResult::success(true),
            Some(flag) if flag == "false" || flag == "0" => StandardResult::success(false),
            Some(_) => StandardResult::fail(format!(
                "Expected boolean (true/false/1/0), received \"{}\"",
                input.unwrap_or_default()
            )),
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        Some(json!({ "type": "boolean" }))
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// A schema accepting one of a fixed set of strings.
#[derive(Debug, Clone)]
pub struct EnumSchema {
    options: Vec<String>,
}

/// Accept exactly one of `options`.
pub fn one_of<I, S>(options: I) -> EnumSchema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EnumSchema {
        options: options.into_iter().map(Into::into).collect(),
    }
}

impl StandardSchema for EnumSchema {
    type Output = String;

    fn validate(&self, input: Option<&str>) -> StandardResult<String> {
        match input {
            None => StandardResult::fail(REQUIRED_MESSAGE),
            Some(value) if self.options.iter().any(|option| option == value) => {
                StandardResult::success(value.to_string())
            }
            Some(_) => {
                let expected: Vec<String> = self
                    .options
                    .iter()
                    .map(|option| format!("\"{}\"", option))
                    .collect();
                StandardResult::fail(format!(
                    "Invalid option: expected one of {}",
                    expected.join("|")
                ))
            }
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        Some(json!({ "type": "string", "enum": self.options }))
    }
}

// ============================================================================
// FromStr and closures
// ============================================================================

/// A schema backed by a type's `FromStr` implementation.
#[derive(Debug, Clone)]
pub struct ParseSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

/// Parse the value with `T::from_str`, reporting the parse error as the issue.
pub fn parse<T>() -> ParseSchema<T>
where
    T: FromStr,
    T::Err: Display,
{
    ParseSchema {
        _marker: PhantomData,
    }
}

impl<T> StandardSchema for ParseSchema<T>
where
    T: FromStr,
    T::Err: Display,
{
    type Output = T;

    fn validate(&self, input: Option<&str>) -> StandardResult<T> {
        match input.map(str::parse::<T>) {
            None => StandardResult::fail(REQUIRED_MESSAGE),
            Some(Ok(value)) => StandardResult::success(value),
            Some(Err(err)) => StandardResult::fail(err.to_string()),
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        Some(json!({ "type": "string" }))
    }
}

/// A schema backed by an arbitrary synchronous closure.
pub struct FnSchema<F, T> {
    validate: F,
    json_schema: Option<serde_json::Value>,
    _marker: PhantomData<fn() -> T>,
}

/// Validate with a closure.
///
/// The schema has no JSON-Schema description unless one is attached with
/// [`FnSchema::with_json_schema`], so it cannot be documented by default.
///
/// # Example
///
/// ```
/// use envase::validators::from_fn;
/// use envase::standard::{Issue, StandardSchema};
/// use stillwater::Validation;
///
/// let even = from_fn(|input: Option<&str>| match input.and_then(|s| s.parse::<u32>().ok()) {
///     Some(n) if n % 2 == 0 => Validation::Success(n),
///     _ => Validation::Failure(vec![Issue::new("Must be an even number")]),
/// });
///
/// assert!(even.validate(Some("4")).is_success());
/// assert!(!even.validate(Some("5")).is_success());
/// ```
pub fn from_fn<F, T>(validate: F) -> FnSchema<F, T>
where
    F: Fn(Option<&str>) -> StandardValidation<T> + Send + Sync,
{
    FnSchema {
        validate,
        json_schema: None,
        _marker: PhantomData,
    }
}

impl<F, T> FnSchema<F, T> {
    /// Attach a JSON-Schema description.
    pub fn with_json_schema(mut self, json_schema: serde_json::Value) -> Self {
        self.json_schema = Some(json_schema);
        self
    }
}

impl<F, T> StandardSchema for FnSchema<F, T>
where
    F: Fn(Option<&str>) -> StandardValidation<T> + Send + Sync,
{
    type Output = T;

    fn validate(&self, input: Option<&str>) -> StandardResult<T> {
        StandardResult::Ready((self.validate)(input))
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        self.json_schema.clone()
    }
}

// ============================================================================
// Combinators
// ============================================================================

/// Absent values succeed with `None`.
#[derive(Debug, Clone)]
pub struct Optional<S> {
    inner: S,
}

impl<S> StandardSchema for Optional<S>
where
    S: StandardSchema,
    S::Output: Send + 'static,
{
    type Output = Option<S::Output>;

    fn validate(&self, input: Option<&str>) -> StandardResult<Self::Output> {
        match input {
            None => StandardResult::success(None),
            Some(_) => self.inner.validate(input).map(Some),
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        self.inner.json_schema()
    }
}

/// Absent values succeed with a fixed default.
#[derive(Debug, Clone)]
pub struct WithDefault<S, T> {
    inner: S,
    default: T,
}

impl<S> StandardSchema for WithDefault<S, S::Output>
where
    S: StandardSchema,
    S::Output: Clone + Serialize + Send + Sync,
{
    type Output = S::Output;

    fn validate(&self, input: Option<&str>) -> StandardResult<Self::Output> {
        match input {
            None => StandardResult::success(self.default.clone()),
            Some(_) => self.inner.validate(input),
        }
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        let mut schema = schema_object(self.inner.json_schema()?);
        if let Ok(default) = serde_json::to_value(&self.default) {
            schema.insert("default".into(), default);
        }
        Some(serde_json::Value::Object(schema))
    }
}

/// Attaches a human-readable description to the JSON schema.
#[derive(Debug, Clone)]
pub struct Described<S> {
    inner: S,
    description: String,
}

impl<S: StandardSchema> StandardSchema for Described<S> {
    type Output = S::Output;

    fn validate(&self, input: Option<&str>) -> StandardResult<Self::Output> {
        self.inner.validate(input)
    }

    fn json_schema(&self) -> Option<serde_json::Value> {
        let mut schema = schema_object(self.inner.json_schema()?);
        schema.insert("description".into(), json!(self.description));
        Some(serde_json::Value::Object(schema))
    }
}

/// Combinators available on every [`StandardSchema`].
pub trait StandardSchemaExt: StandardSchema + Sized {
    /// Allow the variable to be absent.
    fn optional(self) -> Optional<Self> {
        Optional { inner: self }
    }

    /// Use `value` when the variable is absent.
    fn with_default(self, value: Self::Output) -> WithDefault<Self, Self::Output> {
        WithDefault {
            inner: self,
            default: value,
        }
    }

    /// Describe the variable for generated documentation.
    fn describe(self, description: impl Into<String>) -> Described<Self> {
        Described {
            inner: self,
            description: description.into(),
        }
    }
}

impl<S: StandardSchema + Sized> StandardSchemaExt for S {}

/// Run a validator and return its synchronous outcome, `None` if pending.
pub fn validate_now<S: StandardSchema>(
    schema: &S,
    input: Option<&str>,
) -> Option<StandardValidation<S::Output>> {
    match schema.validate(input) {
        StandardResult::Ready(validation) => Some(validation),
        StandardResult::Pending(_) => None,
    }
}

/// Messages of a synchronous failure, empty on success or pending.
pub fn failure_messages<S: StandardSchema>(schema: &S, input: Option<&str>) -> Vec<String> {
    match validate_now(schema, input) {
        Some(Validation::Failure(issues)) => issues.into_iter().map(|issue| issue.message).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success<S: StandardSchema>(schema: &S, input: Option<&str>) -> Option<S::Output> {
        match validate_now(schema, input) {
            Some(Validation::Success(value)) => Some(value),
            _ => None,
        }
    }

    #[test]
    fn test_string_accepts_empty_but_not_absent() {
        let schema = string();
        assert_eq!(success(&schema, Some("")), Some(String::new()));
        assert_eq!(failure_messages(&schema, None), vec!["Required"]);
    }

    #[test]
    fn test_string_accumulates_constraints() {
        let schema = string().min_len(3).pattern(r"^[a-z]+$").unwrap();
        let messages = failure_messages(&schema, Some("A"));
        assert_eq!(
            messages,
            vec![
                "Must be at least 3 characters long".to_string(),
                "Must match pattern ^[a-z]+$".to_string()
            ]
        );
        assert_eq!(success(&schema, Some("abc")), Some("abc".to_string()));
    }

    #[test]
    fn test_string_json_schema() {
        let schema = string().min_len(10).max_len(100).format("uri");
        assert_eq!(
            schema.json_schema(),
            Some(json!({"type": "string", "minLength": 10, "maxLength": 100, "format": "uri"}))
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(string().pattern("(unclosed").is_err());
    }

    #[test]
    fn test_number_parses_and_bounds() {
        let schema = number::<u16>().min(1024).max(9999);
        assert_eq!(success(&schema, Some("3000")), Some(3000));
        assert_eq!(success(&schema, Some(" 3000 ")), Some(3000));
        assert_eq!(
            failure_messages(&schema, Some("80")),
            vec!["Must be greater than or equal to 1024"]
        );
        assert_eq!(
            failure_messages(&schema, Some("abc")),
            vec!["Expected integer, received \"abc\""]
        );
        assert_eq!(failure_messages(&schema, None), vec!["Required"]);
    }

    #[test]
    fn test_float_rejects_non_finite_input() {
        let schema = number::<f64>();
        assert_eq!(success(&schema, Some("1e3")), Some(1000.0));
        for raw in ["NaN", "inf", "-infinity"] {
            assert_eq!(
                failure_messages(&schema, Some(raw)),
                vec![format!("Expected number, received \"{}\"", raw)]
            );
        }
        assert_eq!(failure_messages(&number::<f32>(), Some("1e39")).len(), 1);
    }

    #[test]
    fn test_number_accepts_full_u64_range() {
        assert_eq!(
            success(&number::<u64>(), Some("18446744073709551615")),
            Some(u64::MAX)
        );
    }

    #[test]
    fn test_number_json_schema() {
        assert_eq!(
            number::<f64>().min(0.5).json_schema(),
            Some(json!({"type": "number", "minimum": 0.5}))
        );
        assert_eq!(
            number::<u16>().max(10).json_schema(),
            Some(json!({"type": "integer", "maximum": 10}))
        );
    }

    #[test]
    fn test_boolean() {
        let schema = boolean();
        assert_eq!(success(&schema, Some("true")), Some(true));
        assert_eq!(success(&schema, Some("TRUE")), Some(true));
        assert_eq!(success(&schema, Some("0")), Some(false));
        assert_eq!(
            failure_messages(&schema, Some("maybe")),
            vec!["Expected boolean (true/false/1/0), received \"maybe\""]
        );
    }

    #[test]
    fn test_one_of() {
        let schema = one_of(["production", "test", "development"]);
        assert_eq!(success(&schema, Some("test")), Some("test".to_string()));
        assert_eq!(
            failure_messages(&schema, Some("staging")),
            vec!["Invalid option: expected one of \"production\"|\"test\"|\"development\""]
        );
        assert_eq!(
            schema.json_schema(),
            Some(json!({"type": "string", "enum": ["production", "test", "development"]}))
        );
    }

    #[test]
    fn test_parse_from_str() {
        let schema = parse::<std::net::IpAddr>();
        assert!(success(&schema, Some("127.0.0.1")).is_some());
        assert_eq!(failure_messages(&schema, Some("nope")).len(), 1);
    }

    #[test]
    fn test_optional() {
        let schema = number::<u32>().optional();
        assert_eq!(success(&schema, None), Some(None));
        assert_eq!(success(&schema, Some("7")), Some(Some(7)));
        assert_eq!(failure_messages(&schema, Some("x")).len(), 1);
    }

    #[test]
    fn test_default() {
        let schema = string().with_default("0.0.0.0".to_string());
        assert_eq!(success(&schema, None), Some("0.0.0.0".to_string()));
        assert_eq!(success(&schema, Some("")), Some(String::new()));
        assert_eq!(
            schema.json_schema(),
            Some(json!({"type": "string", "default": "0.0.0.0"}))
        );
    }

    #[test]
    fn test_with_default_on_schema_that_derives_default() {
        #[derive(Debug, Clone, Default)]
        struct Port;

        impl StandardSchema for Port {
            type Output = u16;

            fn validate(&self, input: Option<&str>) -> StandardResult<u16> {
                number::<u16>().validate(input)
            }
        }

        let schema = Port::default().with_default(8080);
        assert_eq!(success(&schema, None), Some(8080));
        assert_eq!(success(&schema, Some("81")), Some(81));

        assert_eq!(string().json_schema(), Some(json!({"type": "string"})));
        assert_eq!(success(&boolean().with_default(true), None), Some(true));
    }

    #[test]
    fn test_describe() {
        let schema = number::<u16>().with_default(3000).describe("Application listening port");
        assert_eq!(
            schema.json_schema(),
            Some(json!({
                "type": "integer",
                "default": 3000,
                "description": "Application listening port"
            }))
        );
    }

    #[test]
    fn test_from_fn_has_no_json_schema() {
        let schema = from_fn(|input: Option<&str>| Validation::Success(input.is_some()));
        assert_eq!(schema.json_schema(), None);
        assert_eq!(success(&schema, None), Some(false));

        let documented = schema.with_json_schema(json!({"type": "boolean"}));
        assert!(documented.json_schema().is_some());
    }
}
