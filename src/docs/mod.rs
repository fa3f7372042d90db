//! Documentation generated from a schema.
//!
//! The documentation layer consumes the schema tree only, never parsed
//! values:
//!
//! - [`extract_envvars`] - flatten a schema into documented variables
//! - [`generate_markdown`] - render them as a markdown document
//! - [`validate_markdown`] - diff a committed document against a fresh rendering
//!
//! # Example
//!
//! ```
//! use envase::{env_schema, envvar};
//! use envase::docs::{render_markdown, validate_markdown};
//! use envase::validators::{one_of, string};
//!
//! let schema = env_schema! {
//!     api_key: envvar("API_KEY", string().min_len(10)),
//!     log: { level: envvar("LOG_LEVEL", one_of(["debug", "info"])) },
//! };
//!
//! let markdown = render_markdown(&schema).unwrap();
//! assert!(markdown.contains("## Log"));
//! assert!(validate_markdown(&markdown, &markdown).is_valid());
//! ```

mod drift;
mod extract;
mod markdown;

pub use drift::{check_markdown_file, normalize_markdown, validate_markdown, LineDiff, MarkdownCheck};
pub use extract::{extract_envvars, ExtractedEnvvar};
pub use markdown::{generate_markdown, MARKDOWN_HEADER};

use crate::error::SchemaError;
use crate::schema::EnvSchema;

/// Extract and render `schema` in one step.
pub fn render_markdown(schema: &EnvSchema) -> Result<String, SchemaError> {
    extract_envvars(schema).map(|envvars| generate_markdown(&envvars))
}
