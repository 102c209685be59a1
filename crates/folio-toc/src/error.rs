//! Errors raised while building tables and TOCs.

use std::path::PathBuf;

use folio_yaml::YamlError;

/// Errors that can occur while ingesting or validating fragments.
///
/// All of these are raised before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum TocError {
    #[error(transparent)]
    Fragment(#[from] YamlError),

    #[error(
        "{}: entry `{entry}` refers to unknown shared definition `{reference}`",
        fragment.display()
    )]
    Resolution {
        fragment: PathBuf,
        entry: String,
        reference: String,
    },

    #[error("{}: entry `{entry}` cannot be mapped to a table row: {reason}", fragment.display())]
    Mapping {
        fragment: PathBuf,
        entry: String,
        reason: String,
    },

    #[error("{}: unresolved references: {}", fragment.display(), unresolved.join(", "))]
    Aggregation {
        fragment: PathBuf,
        unresolved: Vec<String>,
    },
}
