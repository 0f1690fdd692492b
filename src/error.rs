//! Configuration errors: fatal, raised before any file is touched.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("root directory does not exist: {0}")]
    RootMissing(PathBuf),

    #[error("root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("formatter executable not found: {0} (not a file and not on PATH)")]
    FormatterNotFound(PathBuf),

    #[error("no file extensions configured")]
    NoExtensions,

    #[error("invalid concurrency '{0}': expected a positive integer or 'auto'")]
    InvalidConcurrency(String),
}
