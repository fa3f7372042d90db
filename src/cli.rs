//! Command-line glue for documentation commands.
//!
//! A schema is Rust code, so it cannot be loaded from a path at runtime.
//! Instead an application embeds [`DocsCommand`] in its own clap parser and
//! hands its schema to [`run_docs_command`]:
//!
//! ```no_run
//! use clap::Parser;
//! use envase::cli::{run_docs_command, DocsCli};
//! use envase::env::RealEnv;
//! use envase::{env_schema, envvar};
//! use envase::validators::string;
//!
//! let schema = env_schema! { api_key: envvar("API_KEY", string()) };
//! let cli = DocsCli::parse();
//!
//! let code = run_docs_command(
//!     &schema,
//!     &cli.command,
//!     &RealEnv::new(),
//!     &mut std::io::stdout(),
//!     &mut std::io::stderr(),
//! );
//! std::process::exit(i32::from(code));
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::docs::{check_markdown_file, extract_envvars, generate_markdown, MarkdownCheck};
use crate::env::ConfigEnv;
use crate::error::{DocsError, EnvError};
use crate::schema::EnvSchema;

/// Where `generate` writes when no output is given.
pub const DEFAULT_OUTPUT: &str = "./env-docs.md";

/// Documentation commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum DocsCommand {
    /// Generate markdown documentation from the environment schema
    Generate {
        /// Output markdown file path
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Validate that a markdown file matches the schema definition
    Validate {
        /// Markdown file to check
        markdown: PathBuf,
    },
}

/// Standalone parser for binaries that only expose the documentation commands.
#[derive(Debug, Parser)]
#[command(name = "envase", about = "Environment variable documentation")]
pub struct DocsCli {
    #[command(subcommand)]
    pub command: DocsCommand,
}

/// What a documentation command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsOutcome {
    /// Documentation was written to the path
    Generated(PathBuf),
    /// The markdown file matches the schema
    UpToDate,
    /// The markdown file differs from the schema
    Drifted(MarkdownCheck),
}

impl DocsOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            DocsOutcome::Generated(_) | DocsOutcome::UpToDate => 0,
            DocsOutcome::Drifted(_) => 1,
        }
    }
}

/// Execute `command` for `schema` without printing anything.
pub fn execute_docs_command(
    schema: &EnvSchema,
    command: &DocsCommand,
    env: &dyn ConfigEnv,
) -> Result<DocsOutcome, DocsError> {
    match command {
        DocsCommand::Generate { output } => {
            let markdown = generate_markdown(&extract_envvars(schema)?);
            env.write_file(output, &markdown)
                .map_err(|source| DocsError::Write {
                    path: output.display().to_string(),
                    source,
                })?;
            debug!(path = %output.display(), "wrote environment documentation");
            Ok(DocsOutcome::Generated(output.clone()))
        }
        DocsCommand::Validate { markdown: path } => {
            let check = check_markdown_file(env, path, schema)?;
            if check.is_valid() {
                Ok(DocsOutcome::UpToDate)
            } else {
                Ok(DocsOutcome::Drifted(check))
            }
        }
    }
}

/// Execute `command`, report to `out`/`err`, and return the exit status.
///
/// Returns 0 when documentation was generated or is up to date, and 1 on
/// drift or any error.
pub fn run_docs_command(
    schema: &EnvSchema,
    command: &DocsCommand,
    env: &dyn ConfigEnv,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> u8 {
    // Failures writing to the terminal are not actionable here.
    match execute_docs_command(schema, command, env) {
        Ok(outcome) => {
            match &outcome {
                DocsOutcome::Generated(path) => {
                    let _ = writeln!(out, "✓ Documentation generated: {}", path.display());
                }
                DocsOutcome::UpToDate => {
                    let _ = writeln!(out, "Validation passed! The markdown file matches the schema.");
                }
                DocsOutcome::Drifted(check) => {
                    let _ = writeln!(err, "Validation failed! Found differences:\n");
                    for line in check.report_lines() {
                        let _ = writeln!(err, "{}", line);
                    }
                }
            }
            outcome.exit_code()
        }
        Err(error) => {
            let _ = writeln!(err, "Error: {}", error);
            1
        }
    }
}

/// Unwrap a configuration result, or print the error and exit with status 1.
///
/// Meant for `main`, where a misconfigured environment cannot be recovered
/// from without an operator.
pub fn exit_on_error<T>(result: Result<T, EnvError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            eprintln!("{}", error);
            std::process::exit(1)
        }
    }
}
