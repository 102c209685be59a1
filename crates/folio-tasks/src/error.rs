//! Error types for build tasks.

use std::path::PathBuf;

use folio_jobs::RunError;
use folio_toc::TocError;
use folio_yaml::YamlError;
use thiserror::Error;

/// Errors that can occur while generating or running build tasks.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Yaml(#[from] YamlError),

    #[error(transparent)]
    Toc(#[from] TocError),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Run(#[from] RunError),
}
