//! Build tasks for folio documentation sites.
//!
//! Each task walks the source tree, describes its work as
//! [`folio_jobs::Job`]s and hands them to a [`folio_jobs::Runner`]. Jobs share
//! one immutable [`BuildContext`]: the configuration and the compiled
//! templates.

pub mod config;
pub mod context;
pub mod error;
pub mod tasks;
pub mod templates;

pub use config::BuildConfig;
pub use context::{write_output, BuildContext};
pub use error::TaskError;
pub use tasks::{build_all, Outputs, Task};
pub use templates::TemplateEngine;
