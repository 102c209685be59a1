//! Shared definitions that entries can borrow their fields from.
//!
//! Loaded from every `shared-*.yaml` fragment and passed read-only to each
//! TOC build.

use std::path::Path;

use indexmap::IndexMap;

use crate::entry::{EntryFields, RawEntry};
use crate::error::TocError;

/// Shared definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    definitions: IndexMap<String, EntryFields>,
}

impl ReferenceSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load definitions from fragments in the given order.
    ///
    /// A definition in a later fragment replaces an earlier one with the
    /// same id.
    pub fn load<P: AsRef<Path>>(fragments: &[P]) -> Result<Self, TocError> {
        let mut set = Self::new();
        for path in fragments {
            set.ingest(path.as_ref())?;
        }
        Ok(set)
    }

    /// Add every definition in one fragment.
    pub fn ingest(&mut self, path: &Path) -> Result<usize, TocError> {
        let fragment: IndexMap<String, RawEntry> = folio_yaml::ingest_yaml(path)?;
        let count = fragment.len();

        for (id, raw) in fragment {
            self.definitions.insert(id, raw.into_shared());
        }

        tracing::debug!("Loaded {} shared definitions from {}", count, path.display());
        Ok(count)
    }

    /// Add or replace a single definition.
    pub fn insert(&mut self, id: impl Into<String>, fields: EntryFields) {
        self.definitions.insert(id.into(), fields);
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&EntryFields> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn later_fragments_override_earlier_ones() {
        let temp = tempdir().unwrap();
        let first = temp.path().join("shared-a.yaml");
        let second = temp.path().join("shared-b.yaml");
        fs::write(
            &first,
            "backup:\n  ref: /admin/backup\n  description: Old text\nrestore:\n  ref: /admin/restore\n  description: Restore\n",
        )
        .unwrap();
        fs::write(&second, "backup:\n  ref: /admin/backup\n  description: New text\n").unwrap();

        let set = ReferenceSet::load(&[first, second]).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.get("backup").unwrap().description.as_deref(),
            Some("New text")
        );
        assert_eq!(
            set.get("restore").unwrap().target.as_deref(),
            Some("/admin/restore")
        );
    }

    #[test]
    fn shared_ref_without_description_is_a_display_ref() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("shared.yaml");
        fs::write(&path, "faq:\n  ref: /faq\n").unwrap();

        let set = ReferenceSet::load(&[path]).unwrap();

        assert_eq!(set.get("faq").unwrap().target.as_deref(), Some("/faq"));
    }

    #[test]
    fn missing_fragment_is_an_error() {
        let temp = tempdir().unwrap();

        let result = ReferenceSet::load(&[temp.path().join("shared-absent.yaml")]);

        assert!(matches!(result, Err(TocError::Fragment(_))));
    }
}
