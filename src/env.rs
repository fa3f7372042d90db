//! ConfigEnv trait for testable I/O.
//!
//! This module provides the `ConfigEnv` trait that abstracts environment
//! variable and file access, so the parse engine and the documentation checks
//! can run against an in-memory `MockEnv` in tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Environment trait for configuration I/O operations.
///
/// The parse engine only ever calls [`ConfigEnv::get_env`]. File access is
/// used by the documentation layer to read and write committed markdown.
///
/// # Example
///
/// ```
/// use envase::env::{ConfigEnv, MockEnv};
///
/// let env = MockEnv::new().with_env("PORT", "3000");
/// assert_eq!(env.get_env("PORT"), Some("3000".to_string()));
/// assert_eq!(env.get_env("HOST"), None);
/// ```
pub trait ConfigEnv: Send + Sync {
    /// Get an environment variable by name.
    ///
    /// Returns `None` if the variable is not set. A variable set to the empty
    /// string returns `Some("")`.
    fn get_env(&self, name: &str) -> Option<String>;

    /// Get all environment variables.
    fn all_env_vars(&self) -> Vec<(String, String)>;

    /// Read a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if the file does not exist, is not valid UTF-8,
    /// or cannot be read.
    fn read_file(&self, path: &Path) -> io::Result<String>;

    /// Write a file, replacing any previous contents.
    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Check if a file exists.
    fn file_exists(&self, path: &Path) -> bool;
}

/// Production environment using standard library I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl RealEnv {
    /// Create a new real environment.
    pub fn new() -> Self {
        Self
    }
}

impl ConfigEnv for RealEnv {
    /// A value that is not valid UTF-8 reads as absent.
    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn all_env_vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Mock file state for testing.
#[derive(Debug, Clone)]
enum MockFile {
    Content(String),
    PermissionDenied,
}

/// Mock environment for testing configuration loading.
///
/// # Example
///
/// ```
/// use envase::env::MockEnv;
///
/// let env = MockEnv::new()
///     .with_env("DB_HOST", "localhost")
///     .with_env("DB_PORT", "5432")
///     .with_file("docs/env.md", "# Environment variables\n");
/// ```
#[derive(Debug, Default)]
pub struct MockEnv {
    env_vars: RwLock<HashMap<String, String>>,
    files: RwLock<HashMap<PathBuf, MockFile>>,
}

impl MockEnv {
    /// Create a new empty mock environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable.
    pub fn with_env(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_env(name, value);
        self
    }

    /// Set multiple environment variables from an iterator.
    pub fn with_envs<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut env_vars = self
            .env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for (k, v) in vars {
            env_vars.insert(k.into(), v.into());
        }
        drop(env_vars);
        self
    }

    /// Add a file with content.
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add a file that will return "permission denied" error.
    pub fn with_unreadable_file(self, path: impl Into<PathBuf>) -> Self {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), MockFile::PermissionDenied);
        self
    }

    /// Update an environment variable.
    pub fn set_env(&self, name: impl Into<String>, value: impl Into<String>) {
        self.env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), value.into());
    }

    /// Remove an environment variable.
    pub fn remove_env(&self, name: &str) {
        self.env_vars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// Replace a file's contents.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), MockFile::Content(content.into()));
    }

    /// Current contents of a mock file, if it exists and is readable.
    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<String> {
        match self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path.as_ref())
        {
            Some(MockFile::Content(content)) => Some(content.clone()),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MockEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MockEnv::new().with_envs(iter)
    }
}

impl ConfigEnv for MockEnv {
    fn get_env(&self, name: &str) -> Option<String> {
        self.env_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn all_env_vars(&self) -> Vec<(String, String)> {
        self.env_vars
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);

        match files.get(path) {
            Some(MockFile::Content(content)) => Ok(content.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("mock file not found: {}", path.display()),
            )),
            Some(MockFile::PermissionDenied) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock permission denied: {}", path.display()),
            )),
        }
    }

    fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(MockFile::PermissionDenied) = files.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("mock permission denied: {}", path.display()),
            ));
        }
        files.insert(path.to_path_buf(), MockFile::Content(contents.to_string()));
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        matches!(files.get(path), Some(MockFile::Content(_)))
    }
}
