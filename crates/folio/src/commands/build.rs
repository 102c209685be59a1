//! Build commands: run one task or every task.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use folio_jobs::Runner;
use folio_tasks::tasks::robots;
use folio_tasks::{build_all, BuildConfig, BuildContext, Task};
use serde::Serialize;

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: PathBuf,
    pub force: bool,
    pub jobs: Option<usize>,
}

impl Settings {
    /// Load the configuration and build the shared context.
    pub fn context(&self) -> Result<Arc<BuildContext>> {
        Ok(BuildContext::new(load_config(&self.config)?))
    }

    /// Runner honoring `--force` and `--jobs`, falling back to `build.jobs`.
    pub fn runner(&self, ctx: &BuildContext) -> Runner {
        Runner::new()
            .force(self.force)
            .workers(self.jobs.unwrap_or(ctx.config.build.jobs))
    }
}

/// Summary printed by `build --json`.
#[derive(Debug, Serialize)]
struct BuildSummary {
    jobs: usize,
    duration_ms: u128,
    forced: bool,
}

/// Load configuration from folio.toml if it exists.
/// Returns an error if the config file exists but is malformed.
///
/// A relative `paths.projectroot` is taken relative to the config file.
pub fn load_config(config_path: &Path) -> Result<BuildConfig> {
    if config_path.exists() {
        let content = fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!("Failed to read {}: {}", config_path.display(), e)
        })?;
        let mut config: BuildConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse {}: {}", config_path.display(), e)
        })?;

        if let Some(dir) = config_path.parent() {
            if config.paths.projectroot.is_relative() && !dir.as_os_str().is_empty() {
                config.paths.projectroot = dir.join(&config.paths.projectroot);
            }
        }
        config.config_file = Some(config_path.to_path_buf());

        tracing::info!("Loaded config from {}", config_path.display());
        return Ok(config);
    }
    Ok(BuildConfig::default())
}

/// Run a single task.
pub fn run_task(settings: &Settings, task: Task) -> Result<()> {
    let ctx = settings.context()?;
    let runner = settings.runner(&ctx);

    let outputs = task.run(&ctx, &runner)?;
    tracing::debug!("{}: {:?}", task, outputs);

    Ok(())
}

/// Run every task as one job stream.
pub fn run_all(settings: &Settings, json: bool) -> Result<()> {
    tracing::info!("Building documentation sources...");
    let start = Instant::now();

    let ctx = settings.context()?;
    let runner = settings.runner(&ctx);
    let jobs = build_all(&ctx, &runner)?;
    robots::refresh_robots(&ctx)?;

    let summary = BuildSummary {
        jobs,
        duration_ms: start.elapsed().as_millis(),
        forced: runner.is_forced(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        tracing::info!("Ran {} jobs in {}ms", summary.jobs, summary.duration_ms);
    }

    Ok(())
}
