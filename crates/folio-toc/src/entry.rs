//! TOC entries as written in fragments and after resolution.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TocError;
use crate::reference::ReferenceSet;

/// Default sort key for entries without an explicit `order`.
pub const DEFAULT_ORDER: i64 = 999;

/// An entry exactly as it appears in a fragment.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RawEntry {
    /// Display ref when it is a path (`/...`), otherwise the id of a shared
    /// definition.
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    /// Explicit display ref.
    #[serde(default)]
    pub ref_target: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub short_description: Option<String>,

    /// Position override (lower = first)
    #[serde(default)]
    pub order: Option<i64>,
}

/// Displayable fields of an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFields {
    pub target: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub order: Option<i64>,
}

impl EntryFields {
    /// Fill every field that is unset here from `base`.
    fn over(self, base: &EntryFields) -> EntryFields {
        EntryFields {
            target: self.target.or_else(|| base.target.clone()),
            name: self.name.or_else(|| base.name.clone()),
            description: self.description.or_else(|| base.description.clone()),
            short_description: self
                .short_description
                .or_else(|| base.short_description.clone()),
            order: self.order.or(base.order),
        }
    }
}

/// How an entry provides its content, decided once at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryBody {
    /// All fields are written in the fragment.
    Inline(EntryFields),

    /// Fields come from the shared definition `id`; `overrides` win.
    Reference { id: String, overrides: EntryFields },
}

impl RawEntry {
    /// Classify the entry.
    ///
    /// A `ref` that is not a path names a shared definition, and the entry's
    /// own fields override it. Every other entry is inline and its display
    /// ref is `ref-target`, falling back to `ref`.
    pub fn into_body(self) -> EntryBody {
        match self.reference {
            Some(id) if !is_path(&id) => EntryBody::Reference {
                id,
                overrides: EntryFields {
                    target: self.ref_target,
                    name: self.name,
                    description: self.description,
                    short_description: self.short_description,
                    order: self.order,
                },
            },
            reference => EntryBody::Inline(EntryFields {
                target: self.ref_target.or(reference),
                name: self.name,
                description: self.description,
                short_description: self.short_description,
                order: self.order,
            }),
        }
    }

    /// Fields of a shared definition. `ref` is always a display ref here.
    pub(crate) fn into_shared(self) -> EntryFields {
        EntryFields {
            target: self.ref_target.or(self.reference),
            name: self.name,
            description: self.description,
            short_description: self.short_description,
            order: self.order,
        }
    }
}

fn is_path(reference: &str) -> bool {
    reference.starts_with('/')
}

/// A resolved entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub id: String,
    pub fields: EntryFields,
    /// Fragment the entry was ingested from.
    pub source: PathBuf,
}

impl TocEntry {
    /// Resolve a raw entry against the shared definitions.
    pub fn resolve(
        id: &str,
        raw: RawEntry,
        source: &Path,
        references: &ReferenceSet,
    ) -> Result<Self, TocError> {
        let fields = match raw.into_body() {
            EntryBody::Inline(fields) => fields,
            EntryBody::Reference { id: shared, overrides } => {
                let base = references.get(&shared).ok_or_else(|| TocError::Resolution {
                    fragment: source.to_path_buf(),
                    entry: id.to_string(),
                    reference: shared.clone(),
                })?;
                overrides.over(base)
            }
        };

        Ok(Self {
            id: id.to_string(),
            fields,
            source: source.to_path_buf(),
        })
    }

    /// Name shown for the entry: `name`, then the display ref, then the id.
    pub fn display_name(&self) -> &str {
        self.fields
            .name
            .as_deref()
            .or(self.fields.target.as_deref())
            .unwrap_or(&self.id)
    }

    /// The ref the entry links to, or its id when none is set.
    pub fn link(&self) -> &str {
        self.fields.target.as_deref().unwrap_or(&self.id)
    }

    pub fn description(&self) -> &str {
        self.fields.description.as_deref().unwrap_or("")
    }

    pub fn sort_key(&self) -> i64 {
        self.fields.order.unwrap_or(DEFAULT_ORDER)
    }
}
