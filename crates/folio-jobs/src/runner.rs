//! The job runner.

use std::collections::HashSet;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::job::{Job, JobError};

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Job {name} failed")]
    Job {
        name: String,
        #[source]
        source: JobError,
    },

    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Executes stale jobs from a lazy job stream.
///
/// The first failing job aborts the run; nothing after it is started and no
/// partial results are returned.
#[derive(Debug, Clone)]
pub struct Runner {
    force: bool,
    workers: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            force: false,
            workers: 1,
        }
    }
}

impl Runner {
    /// Create a sequential runner that skips fresh jobs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every job regardless of target freshness.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Number of jobs executed concurrently (at least one).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Run due jobs and return their results in job order.
    pub fn run<R, I>(&self, jobs: I) -> Result<Vec<R>, RunError>
    where
        R: Send,
        I: IntoIterator<Item = Job<R>>,
    {
        let mut results = Vec::new();
        self.drive(jobs, |result| results.push(result))?;
        Ok(results)
    }

    /// Run due jobs and return how many were invoked.
    pub fn count<R, I>(&self, jobs: I) -> Result<usize, RunError>
    where
        R: Send,
        I: IntoIterator<Item = Job<R>>,
    {
        let mut invoked = 0;
        self.drive(jobs, |_| invoked += 1)?;
        Ok(invoked)
    }

    fn drive<R, I, F>(&self, jobs: I, sink: F) -> Result<(), RunError>
    where
        R: Send,
        I: IntoIterator<Item = Job<R>>,
        F: FnMut(R),
    {
        if self.workers == 1 {
            self.drive_sequential(jobs, sink)
        } else {
            self.drive_parallel(jobs, sink)
        }
    }

    fn drive_sequential<R, I, F>(&self, jobs: I, mut sink: F) -> Result<(), RunError>
    where
        I: IntoIterator<Item = Job<R>>,
        F: FnMut(R),
    {
        for job in jobs {
            if !job.is_due(self.force) {
                tracing::debug!("Skipping up-to-date job {}", job.name());
                continue;
            }
            sink(job.execute()?);
        }
        Ok(())
    }

    /// Execute due jobs in windows of `2 * workers` on a rayon pool.
    ///
    /// A job whose target is already claimed in the current window flushes
    /// the window before its own staleness is checked, so jobs that share a
    /// target never overlap and make the same skip decisions as a
    /// sequential run.
    fn drive_parallel<R, I, F>(&self, jobs: I, mut sink: F) -> Result<(), RunError>
    where
        R: Send,
        I: IntoIterator<Item = Job<R>>,
        F: FnMut(R),
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        let capacity = self.workers * 2;
        let mut window: Vec<Job<R>> = Vec::with_capacity(capacity);
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        let mut flush = |window: &mut Vec<Job<R>>,
                         claimed: &mut HashSet<PathBuf>|
         -> Result<(), RunError> {
            if window.is_empty() {
                return Ok(());
            }
            let batch: Vec<Job<R>> = std::mem::take(window);
            claimed.clear();

            let results: Vec<R> = pool.install(|| {
                batch
                    .into_par_iter()
                    .map(Job::execute)
                    .collect::<Result<Vec<R>, RunError>>()
            })?;

            for result in results {
                sink(result);
            }
            Ok(())
        };

        for job in jobs {
            let conflicts = job.targets().iter().any(|t| claimed.contains(t));
            if conflicts || window.len() == capacity {
                flush(&mut window, &mut claimed)?;
            }

            if !job.is_due(self.force) {
                tracing::debug!("Skipping up-to-date job {}", job.name());
                continue;
            }

            claimed.extend(job.targets().iter().cloned());
            window.push(job);
        }

        flush(&mut window, &mut claimed)
    }
}
