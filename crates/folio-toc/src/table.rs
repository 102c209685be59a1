//! Tables: the projection target of TOCs and the model of table fragments.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TocError;

/// A validated table with a header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub title: Option<String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Relative column widths
    pub widths: Option<Vec<u32>>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    pub fn columns(&self) -> usize {
        self.header.len()
    }
}

/// A table fragment (`table-<name>.yaml`).
///
/// ```yaml
/// title: Limits
/// header: [Limit, Value]
/// rows:
///   - [Document size, 16 MB]
/// widths: [40, 60]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableFragment {
    #[serde(default)]
    pub title: Option<String>,

    /// Requested output format. Tables are always emitted as list tables,
    /// so this is accepted but not acted on.
    #[serde(default)]
    pub format: Option<String>,

    pub header: Vec<String>,

    #[serde(default)]
    pub rows: Vec<Vec<String>>,

    #[serde(default)]
    pub widths: Option<Vec<u32>>,

    #[serde(skip)]
    pub source: PathBuf,
}

impl TableFragment {
    /// Load a table fragment.
    pub fn load(path: &Path) -> Result<Self, TocError> {
        let mut fragment: TableFragment = folio_yaml::ingest_yaml(path)?;
        fragment.source = path.to_path_buf();
        Ok(fragment)
    }

    /// Validate row and width shapes against the header.
    pub fn into_table(self) -> Result<Table, TocError> {
        let columns = self.header.len();

        if let Some(widths) = &self.widths {
            if widths.len() != columns {
                return Err(self.mapping_error(
                    "widths",
                    format!("{} widths for {} columns", widths.len(), columns),
                ));
            }
        }

        if let Some((index, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns)
        {
            return Err(self.mapping_error(
                &format!("row {}", index + 1),
                format!("{} cells for {} columns", row.len(), columns),
            ));
        }

        Ok(Table {
            title: self.title,
            header: self.header,
            rows: self.rows,
            widths: self.widths,
        })
    }

    fn mapping_error(&self, entry: &str, reason: String) -> TocError {
        TocError::Mapping {
            fragment: self.source.clone(),
            entry: entry.to_string(),
            reason,
        }
    }
}
