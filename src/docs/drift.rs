//! Detect drift between committed markdown and the schema it documents.

use std::fmt;
use std::path::Path;

use tracing::debug;

use super::extract::extract_envvars;
use super::markdown::generate_markdown;
use crate::env::ConfigEnv;
use crate::error::DocsError;
use crate::schema::EnvSchema;

/// One line that differs between the actual and the expected document.
///
/// Line numbers are 1-based and refer to the normalised documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDiff {
    /// The expected document has a line the actual one lacks
    Missing { line: usize, expected: String },
    /// The actual document has a line the expected one lacks
    Extra { line: usize, actual: String },
    /// Both documents have the line but it differs
    Mismatch {
        line: usize,
        expected: String,
        actual: String,
    },
}

impl LineDiff {
    /// 1-based line number of the difference.
    pub fn line(&self) -> usize {
        match self {
            LineDiff::Missing { line, .. }
            | LineDiff::Extra { line, .. }
            | LineDiff::Mismatch { line, .. } => *line,
        }
    }

    /// Human-readable report, one entry per output line.
    pub fn report_lines(&self) -> Vec<String> {
        match self {
            LineDiff::Missing { line, expected } => vec![
                format!("Line {}: Missing in actual file", line),
                format!("  Expected: {}", expected),
            ],
            LineDiff::Extra { line, actual } => vec![
                format!("Line {}: Extra line in actual file", line),
                format!("  Actual: {}", actual),
            ],
            LineDiff::Mismatch {
                line,
                expected,
                actual,
            } => vec![
                format!("Line {}: Content mismatch", line),
                format!("  Expected: {}", expected),
                format!("  Actual:   {}", actual),
            ],
        }
    }
}

impl fmt::Display for LineDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report_lines().join("\n"))
    }
}

/// Outcome of comparing a document against its expected rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownCheck {
    differences: Vec<LineDiff>,
}

impl MarkdownCheck {
    /// Whether the documents match after normalisation.
    pub fn is_valid(&self) -> bool {
        self.differences.is_empty()
    }

    /// Every differing line in document order.
    pub fn differences(&self) -> &[LineDiff] {
        &self.differences
    }

    /// The full report, flattened to output lines.
    pub fn report_lines(&self) -> Vec<String> {
        self.differences.iter().flat_map(LineDiff::report_lines).collect()
    }
}

/// Trim, convert CRLF to LF, and collapse runs of blank lines to one.
pub fn normalize_markdown(content: &str) -> String {
    let unix = content.trim().replace("\r\n", "\n");
    let mut lines: Vec<&str> = Vec::new();
    for line in unix.split('\n') {
        if line.is_empty() && lines.last().is_some_and(|prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Compare `actual` with `expected` line by line after normalising both.
///
/// # Example
///
/// ```
/// use envase::docs::validate_markdown;
///
/// let check = validate_markdown("# Title\r\n\r\n\r\nbody\n", "# Title\n\nbody");
/// assert!(check.is_valid());
///
/// let check = validate_markdown("# Title\nbody", "# Title\nhead");
/// assert_eq!(
///     check.report_lines(),
///     vec![
///         "Line 2: Content mismatch",
///         "  Expected: head",
///         "  Actual:   body",
///     ]
/// );
/// ```
pub fn validate_markdown(actual: &str, expected: &str) -> MarkdownCheck {
    let actual = normalize_markdown(actual);
    let expected = normalize_markdown(expected);

    if actual == expected {
        return MarkdownCheck::default();
    }

    let actual_lines: Vec<&str> = actual.split('\n').collect();
    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let total = actual_lines.len().max(expected_lines.len());

    let differences = (0..total)
        .filter_map(|index| {
            let line = index + 1;
            let (actual_line, expected_line) = (actual_lines.get(index), expected_lines.get(index));
            // a line past the end of either document reads as blank
            if actual_line.map_or("", |a| *a) == expected_line.map_or("", |e| *e) {
                return None;
            }
            match (actual_line, expected_line) {
                (Some(a), Some(e)) => Some(LineDiff::Mismatch {
                    line,
                    expected: e.to_string(),
                    actual: a.to_string(),
                }),
                (None, Some(e)) => Some(LineDiff::Missing {
                    line,
                    expected: e.to_string(),
                }),
                (Some(a), None) => Some(LineDiff::Extra {
                    line,
                    actual: a.to_string(),
                }),
                (None, None) => None,
            }
        })
        .collect();

    MarkdownCheck { differences }
}

/// Render `schema` and compare it against the markdown file at `path`.
pub fn check_markdown_file(
    env: &dyn ConfigEnv,
    path: &Path,
    schema: &EnvSchema,
) -> Result<MarkdownCheck, DocsError> {
    let expected = generate_markdown(&extract_envvars(schema)?);
    let actual = env.read_file(path).map_err(|source| DocsError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let check = validate_markdown(&actual, &expected);
    debug!(
        path = %path.display(),
        differences = check.differences().len(),
        "checked environment documentation"
    );
    Ok(check)
}
