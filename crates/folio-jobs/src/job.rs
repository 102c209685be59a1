//! Job descriptors.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::dependency::is_stale;

/// Error type returned by job callables.
///
/// Boxed so that any library error converts with `?` inside a job body.
pub type JobError = Box<dyn std::error::Error + Send + Sync>;

/// Result of invoking a job callable.
pub type JobResult<R> = Result<R, JobError>;

/// Zero, one or many paths.
///
/// Targets and dependencies accept a single path or a sequence; both are
/// normalized into a list here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathList(Vec<PathBuf>);

impl PathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.0.push(path.into());
    }
}

impl From<PathBuf> for PathList {
    fn from(path: PathBuf) -> Self {
        Self(vec![path])
    }
}

impl From<&Path> for PathList {
    fn from(path: &Path) -> Self {
        Self(vec![path.to_path_buf()])
    }
}

impl From<&str> for PathList {
    fn from(path: &str) -> Self {
        Self(vec![PathBuf::from(path)])
    }
}

impl From<Vec<PathBuf>> for PathList {
    fn from(paths: Vec<PathBuf>) -> Self {
        Self(paths)
    }
}

impl<const N: usize> From<[PathBuf; N]> for PathList {
    fn from(paths: [PathBuf; N]) -> Self {
        Self(paths.into())
    }
}

impl FromIterator<PathBuf> for PathList {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<PathBuf> for PathList {
    fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a PathList {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One unit of schedulable work.
///
/// The callable and its arguments are captured when the job is created and
/// invoked at most once, by the runner.
pub struct Job<R = ()> {
    name: String,
    target: PathList,
    dependency: PathList,
    call: Box<dyn FnOnce() -> JobResult<R> + Send>,
}

impl<R> Job<R> {
    /// Describe a job that calls `job(args)` when it runs.
    ///
    /// `name` identifies the job in logs and errors; use the source file it
    /// reads where there is one.
    pub fn new<A, F>(name: impl Into<String>, job: F, args: A) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A) -> JobResult<R> + Send + 'static,
    {
        Self {
            name: name.into(),
            target: PathList::new(),
            dependency: PathList::new(),
            call: Box::new(move || job(args)),
        }
    }

    /// Set the output path(s) this job writes.
    pub fn target(mut self, target: impl Into<PathList>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the input path(s) whose freshness gates this job.
    pub fn dependency(mut self, dependency: impl Into<PathList>) -> Self {
        self.dependency = dependency.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn targets(&self) -> &[PathBuf] {
        self.target.as_slice()
    }

    pub fn dependencies(&self) -> &[PathBuf] {
        self.dependency.as_slice()
    }

    /// Whether the job has to run.
    ///
    /// A job without targets always runs; otherwise it runs when forced or
    /// when any of its targets is stale.
    pub fn is_due(&self, force: bool) -> bool {
        self.target.is_empty()
            || force
            || self
                .target
                .iter()
                .any(|target| is_stale(target, self.dependency.as_slice()))
    }

    /// Invoke the callable, consuming the job.
    pub(crate) fn execute(self) -> Result<R, crate::runner::RunError> {
        let Self { name, call, .. } = self;
        tracing::debug!("Running job {}", name);
        call().map_err(|source| crate::runner::RunError::Job { name, source })
    }
}

impl<R> fmt::Debug for Job<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("dependency", &self.dependency)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::tests::touch;
    use tempfile::tempdir;

    fn noop(_: ()) -> JobResult<()> {
        Ok(())
    }

    #[test]
    fn untargeted_job_is_always_due() {
        let job = Job::new("options", noop, ()).dependency("/does/not/matter.yaml");

        assert!(job.is_due(false));
    }

    #[test]
    fn fresh_targets_are_not_due_unless_forced() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("table-a.yaml");
        let first = temp.path().join("a.rst");
        let second = temp.path().join("a-list.rst");
        touch(&source, 1_000);
        touch(&first, 2_000);
        touch(&second, 2_000);

        let job = Job::new("table", noop, ())
            .target([first, second])
            .dependency(source);

        assert!(!job.is_due(false));
        assert!(job.is_due(true));
    }

    #[test]
    fn one_stale_target_makes_job_due() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("table-a.yaml");
        let first = temp.path().join("a.rst");
        touch(&source, 1_000);
        touch(&first, 2_000);

        let job = Job::new("table", noop, ())
            .target(vec![first, temp.path().join("a-list.rst")])
            .dependency(source);

        assert!(job.is_due(false));
    }

    #[test]
    fn passes_arguments_to_callable() {
        let job = Job::new("sum", |(a, b): (u32, u32)| Ok(a + b), (2, 3));

        assert_eq!(job.execute().unwrap(), 5);
    }

    #[test]
    fn failure_names_the_job() {
        let job: Job<()> = Job::new("broken", |_: ()| Err("boom".into()), ());

        let err = job.execute().unwrap_err();

        assert!(err.to_string().contains("broken"));
    }
}
