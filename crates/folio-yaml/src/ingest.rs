//! Loading YAML documents into typed records.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Errors that can occur when ingesting a YAML file.
#[derive(Debug, thiserror::Error)]
pub enum YamlError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl YamlError {
    /// Path of the file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    /// Whether the file was missing rather than malformed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

fn read(path: &Path) -> Result<String, YamlError> {
    fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_error(path: &Path, err: serde_yaml::Error) -> YamlError {
    YamlError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Load a file holding a single YAML document.
pub fn ingest_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let content = read(path)?;
    ingest_yaml_str(path, &content)
}

/// Parse a single YAML document. `path` is only used for error reporting.
pub fn ingest_yaml_str<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, YamlError> {
    serde_yaml::from_str(content).map_err(|e| parse_error(path, e))
}

/// Load a list of records from a file.
///
/// Accepts both layouts used by the data files: a stream of documents
/// separated by `---` (one record per document), or a single document whose
/// top level is a sequence. Empty documents are skipped.
pub fn ingest_yaml_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, YamlError> {
    let content = read(path)?;

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| parse_error(path, e))?;
        if !value.is_null() {
            documents.push(value);
        }
    }

    let values = match documents.as_slice() {
        [serde_yaml::Value::Sequence(items)] => items.clone(),
        _ => documents,
    };

    values
        .into_iter()
        .map(|value| serde_yaml::from_value(value).map_err(|e| parse_error(path, e)))
        .collect()
}
