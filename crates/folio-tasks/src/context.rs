//! State shared by every job of a build.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::error::TaskError;
use crate::templates::TemplateEngine;

/// Configuration and compiled templates, shared read-only between jobs.
pub struct BuildContext {
    pub config: BuildConfig,
    pub templates: TemplateEngine,
}

impl BuildContext {
    pub fn new(config: BuildConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            templates: TemplateEngine::new(),
        })
    }
}

/// Write a generated file, creating parent directories as needed.
pub fn write_output(path: &Path, content: &str) -> Result<PathBuf, TaskError> {
    let wrap = |source| TaskError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, content).map_err(wrap)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path.to_path_buf())
}
