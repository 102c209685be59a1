//! Build tasks and their job generators.
//!
//! Every generator returns a lazy stream of jobs so the runner can start
//! working before the whole source tree has been walked.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use folio_jobs::{Job, Runner};

use crate::context::BuildContext;
use crate::error::TaskError;

pub mod api;
pub mod hash;
pub mod htaccess;
pub mod images;
pub mod includes;
pub mod options;
pub mod releases;
pub mod robots;
pub mod steps;
pub mod tables;
pub mod toc;

/// Files written by one job.
pub type Outputs = Vec<PathBuf>;

/// A boxed job stream.
pub type JobStream = Box<dyn Iterator<Item = Job<Outputs>>>;

/// Tasks that run through the job runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Toc,
    Tables,
    Api,
    Steps,
    Options,
    Images,
    Releases,
    Htaccess,
}

impl Task {
    /// Every task, in the order a full build runs them.
    pub const ALL: [Task; 8] = [
        Task::Toc,
        Task::Tables,
        Task::Api,
        Task::Steps,
        Task::Options,
        Task::Images,
        Task::Releases,
        Task::Htaccess,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Task::Toc => "toc",
            Task::Tables => "tables",
            Task::Api => "api",
            Task::Steps => "steps",
            Task::Options => "options",
            Task::Images => "images",
            Task::Releases => "releases",
            Task::Htaccess => "htaccess",
        }
    }

    /// Job stream of this task.
    pub fn jobs(self, ctx: &Arc<BuildContext>) -> Result<JobStream, TaskError> {
        Ok(match self {
            Task::Toc => Box::new(toc::jobs(ctx)?),
            Task::Tables => Box::new(tables::jobs(ctx)),
            Task::Api => Box::new(api::jobs(ctx)),
            Task::Steps => Box::new(steps::jobs(ctx)),
            Task::Options => Box::new(options::jobs(ctx)?),
            Task::Images => Box::new(images::jobs(ctx)?),
            Task::Releases => Box::new(releases::jobs(ctx)?),
            Task::Htaccess => Box::new(htaccess::jobs(ctx, &ctx.config.htaccess_file())),
        })
    }

    /// Run this task's jobs and return the files they wrote.
    pub fn run(self, ctx: &Arc<BuildContext>, runner: &Runner) -> Result<Outputs, TaskError> {
        let outputs: Outputs = runner
            .run(self.jobs(ctx)?)?
            .into_iter()
            .flatten()
            .collect();

        tracing::info!("{}: wrote {} files", self, outputs.len());
        Ok(outputs)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run every task as one job stream. Returns the number of jobs executed.
pub fn build_all(ctx: &Arc<BuildContext>, runner: &Runner) -> Result<usize, TaskError> {
    let mut stream: JobStream = Box::new(std::iter::empty());
    for task in Task::ALL {
        stream = Box::new(stream.chain(task.jobs(ctx)?));
    }

    let executed = runner.count(stream)?;
    tracing::info!("Build complete: {} jobs executed", executed);
    Ok(executed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// A project rooted in a temp dir with default layout.
    pub(crate) fn project() -> (TempDir, Arc<BuildContext>) {
        let temp = tempdir().unwrap();
        let ctx = BuildContext::new(BuildConfig::with_root(temp.path()));
        (temp, ctx)
    }

    pub(crate) fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn empty_project_builds_nothing() {
        let (_temp, ctx) = project();

        let executed = build_all(&ctx, &Runner::new()).unwrap();

        assert_eq!(executed, 0);
    }

    #[test]
    fn full_build_is_incremental() {
        let (_temp, ctx) = project();
        let includes = ctx.config.includes_dir();
        write(
            &includes.join("toc-install.yaml"),
            "linux:\n  ref: /install/linux\n  description: Linux\n",
        );
        write(
            &includes.join("table-limits.yaml"),
            "header: [Limit, Value]\nrows:\n  - [Size, 16 MB]\n",
        );
        write(
            &includes.join("step-install.yaml"),
            "title: Download\naction:\n  code: curl -O archive.tgz\n",
        );

        let first = build_all(&ctx, &Runner::new()).unwrap();
        let second = build_all(&ctx, &Runner::new()).unwrap();
        let forced = build_all(&ctx, &Runner::new().force(true)).unwrap();

        assert_eq!(first, 3);
        assert_eq!(second, 0);
        assert_eq!(forced, 3);
    }
}
