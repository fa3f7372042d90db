//! Runtime mode flags derived from `NODE_ENV`.
//!
//! Kept apart from the parse engine: the flags are never merged into a parsed
//! configuration. Applications that want them alongside their config read them
//! separately or add them as computed values.

use serde::Serialize;

use crate::env::ConfigEnv;

/// Name of the variable the runtime mode is read from.
pub const RUNTIME_MODE_VAR: &str = "NODE_ENV";

/// Which kind of deployment the process runs in.
///
/// At most one flag is set. An absent or unrecognised `NODE_ENV` leaves all
/// three false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeMode {
    pub is_production: bool,
    pub is_test: bool,
    pub is_development: bool,
}

impl RuntimeMode {
    /// Classify a raw `NODE_ENV` value. Matching is exact and case-sensitive.
    pub fn from_value(value: Option<&str>) -> Self {
        Self {
            is_production: value == Some("production"),
            is_test: value == Some("test"),
            is_development: value == Some("development"),
        }
    }
}

/// Read `NODE_ENV` from `env` and classify it.
///
/// # Example
///
/// ```
/// use envase::env::MockEnv;
/// use envase::mode::detect_runtime_mode;
///
/// let mode = detect_runtime_mode(&MockEnv::new().with_env("NODE_ENV", "test"));
/// assert!(mode.is_test);
/// assert!(!mode.is_production);
/// ```
pub fn detect_runtime_mode(env: &dyn ConfigEnv) -> RuntimeMode {
    RuntimeMode::from_value(env.get_env(RUNTIME_MODE_VAR).as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    fn mode_for(value: &str) -> RuntimeMode {
        detect_runtime_mode(&MockEnv::new().with_env("NODE_ENV", value))
    }

    #[test]
    fn test_known_modes() {
        assert_eq!(
            mode_for("production"),
            RuntimeMode {
                is_production: true,
                is_test: false,
                is_development: false
            }
        );
        assert!(mode_for("test").is_test);
        assert!(mode_for("development").is_development);
    }

    #[test]
    fn test_missing_or_unknown_mode() {
        assert_eq!(detect_runtime_mode(&MockEnv::new()), RuntimeMode::default());
        assert_eq!(mode_for("staging"), RuntimeMode::default());
        assert_eq!(mode_for("Production"), RuntimeMode::default());
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(mode_for("production")).unwrap();
        assert_eq!(json["isProduction"], serde_json::Value::Bool(true));
        assert_eq!(json["isTest"], serde_json::Value::Bool(false));
    }
}
