//! Integration tests for the documentation commands against the real filesystem.

#![cfg(feature = "cli")]

use std::fs;

use envase::cli::{execute_docs_command, run_docs_command, DocsCli, DocsCommand, DocsOutcome};
use envase::prelude::*;
use tempfile::TempDir;

fn schema() -> EnvSchema {
    env_schema! {
        api_key: envvar("API_KEY", string().describe("Key for the upstream API")),
        server: {
            port: envvar("PORT", number::<u16>().with_default(8080)),
        },
    }
}

fn run(command: &DocsCommand) -> (u8, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run_docs_command(&schema(), command, &RealEnv::new(), &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn test_generate_writes_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("env.md");

    let (code, out, err) = run(&DocsCommand::Generate {
        output: output.clone(),
    });

    assert_eq!(code, 0, "stderr: {}", err);
    assert_eq!(
        out,
        format!("✓ Documentation generated: {}\n", output.display())
    );
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.starts_with("# Environment variables\n"));
    assert!(written.contains("## Server"));
    assert!(written.contains("Key for the upstream API"));
}

#[test]
fn test_validate_fresh_file_passes() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("env.md");
    run(&DocsCommand::Generate {
        output: output.clone(),
    });

    let (code, out, _) = run(&DocsCommand::Validate { markdown: output });

    assert_eq!(code, 0);
    assert_eq!(out, "Validation passed! The markdown file matches the schema.\n");
}

#[test]
fn test_validate_tolerates_trailing_blank_lines() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("env.md");
    run(&DocsCommand::Generate {
        output: output.clone(),
    });
    let padded = format!("{}\n\n\n", fs::read_to_string(&output).unwrap());
    fs::write(&output, padded).unwrap();

    let outcome = execute_docs_command(
        &schema(),
        &DocsCommand::Validate { markdown: output },
        &RealEnv::new(),
    )
    .unwrap();

    assert_eq!(outcome, DocsOutcome::UpToDate);
}

#[test]
fn test_validate_edited_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("env.md");
    run(&DocsCommand::Generate {
        output: output.clone(),
    });
    let edited = fs::read_to_string(&output)
        .unwrap()
        .replace("Key for the upstream API", "Old description");
    fs::write(&output, edited).unwrap();

    let (code, out, err) = run(&DocsCommand::Validate { markdown: output });

    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert_eq!(
        err,
        concat!(
            "Validation failed! Found differences:\n",
            "\n",
            "Line 4: Content mismatch\n",
            "  Expected:   Key for the upstream API\n",
            "  Actual:     Old description\n",
        )
    );
}

#[test]
fn test_validate_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.md");

    let (code, _, err) = run(&DocsCommand::Validate { markdown: missing });

    assert_eq!(code, 1);
    assert!(err.starts_with("Error: failed to read "));
}

#[test]
fn test_parsed_command_runs() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("docs.md");
    let output_arg = output.to_string_lossy().into_owned();

    let cli = <DocsCli as clap::Parser>::try_parse_from(["envase", "generate", "--output", &output_arg])
        .unwrap();
    let (code, _, _) = run(&cli.command);

    assert_eq!(code, 0);
    assert!(output.is_file());
}
