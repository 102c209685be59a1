//! Dependency-driven job execution for folio.
//!
//! Task generators describe work as [`Job`]s: the files a job writes, the
//! files it reads, and the callable that does the writing. The [`Runner`]
//! pulls jobs lazily, skips the ones whose targets are already newer than
//! their dependencies, and executes the rest.

pub mod dependency;
pub mod job;
pub mod runner;

pub use dependency::{is_stale, StaleCheckError};
pub use job::{Job, JobError, JobResult, PathList};
pub use runner::{RunError, Runner};
