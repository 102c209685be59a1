//! Building and freezing TOC trees.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::entry::{RawEntry, TocEntry};
use crate::error::TocError;
use crate::kind::{TocFormat, TocKind, TocVariant};
use crate::reference::ReferenceSet;
use crate::table::Table;

type Fragment = IndexMap<String, RawEntry>;

/// One line of an aggregation driver.
///
/// `file` is relative to the driver's directory. Without an `id`, every
/// entry of the file is pulled in.
#[derive(Debug, Clone, Deserialize)]
struct DriverRef {
    file: PathBuf,
    #[serde(default)]
    id: Option<String>,
}

impl DriverRef {
    fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{}#{}", self.file.display(), id),
            None => self.file.display().to_string(),
        }
    }
}

/// A definition-list item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DfnItem {
    pub id: String,
    pub term: String,
    pub target: String,
    pub definition: String,
}

/// Files referenced by an aggregation driver, resolved against its directory.
pub fn driver_sources(driver: &Path) -> Result<Vec<PathBuf>, TocError> {
    let refs: Vec<DriverRef> = folio_yaml::ingest_yaml_list(driver)?;
    let base = driver.parent().unwrap_or(Path::new(""));

    let mut sources: Vec<PathBuf> = Vec::new();
    for r in refs {
        let path = base.join(&r.file);
        if !sources.contains(&path) {
            sources.push(path);
        }
    }
    Ok(sources)
}

/// Accumulates a TOC from fragments.
///
/// The build phases can be called in any combination and repeated; each
/// recomputes its view from the ingested entries. Ingestion itself happens
/// once, on first use. [`finalize`](Self::finalize) consumes the builder.
#[derive(Debug)]
pub struct TocBuilder<'r> {
    kind: TocKind,
    source: PathBuf,
    references: &'r ReferenceSet,
    entries: Option<IndexMap<String, TocEntry>>,
    unresolved: Vec<String>,
    contents: bool,
    dfn: Option<IndexMap<String, DfnItem>>,
    table: Option<(Vec<String>, IndexMap<String, Vec<String>>)>,
}

impl<'r> TocBuilder<'r> {
    /// Start a build for the fragment (or driver) at `source`.
    pub fn new(source: impl Into<PathBuf>, kind: TocKind, references: &'r ReferenceSet) -> Self {
        Self {
            kind,
            source: source.into(),
            references,
            entries: None,
            unresolved: Vec::new(),
            contents: false,
            dfn: None,
            table: None,
        }
    }

    pub fn kind(&self) -> TocKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Ingest entries and keep them as the contents view.
    pub fn build_contents(&mut self) -> Result<(), TocError> {
        self.ingest()?;
        self.contents = true;
        Ok(())
    }

    /// Ingest entries and project them into a definition list.
    pub fn build_dfn(&mut self) -> Result<(), TocError> {
        let entries = self.ingest()?;

        let dfn = entries
            .values()
            .map(|entry| {
                let item = DfnItem {
                    id: entry.id.clone(),
                    term: entry.display_name().to_string(),
                    target: entry.link().to_string(),
                    definition: entry.description().to_string(),
                };
                (entry.id.clone(), item)
            })
            .collect();

        self.dfn = Some(dfn);
        Ok(())
    }

    /// Ingest entries and project each into exactly one table row.
    ///
    /// Every entry needs a display ref, and no two entries may map to the
    /// same ref.
    pub fn build_table(&mut self) -> Result<(), TocError> {
        let format = self.kind.format;
        let source = self.source.clone();
        let entries = self.ingest()?;

        let mut header = vec![
            "Ref".to_string(),
            "Name".to_string(),
            "Description".to_string(),
        ];
        if format == TocFormat::Toc {
            header.push("Summary".to_string());
        }

        let rows = {
            let mut mapped: HashMap<&str, &str> = HashMap::new();
            let mut rows = IndexMap::with_capacity(entries.len());

            for entry in entries.values() {
                let mapping_error = |reason: String| TocError::Mapping {
                    fragment: source.clone(),
                    entry: entry.id.clone(),
                    reason,
                };

                let target = entry
                    .fields
                    .target
                    .as_deref()
                    .ok_or_else(|| mapping_error("entry has no ref".to_string()))?;

                if let Some(previous) = mapped.insert(target, &entry.id) {
                    return Err(mapping_error(format!(
                        "ref `{target}` is already mapped by entry `{previous}`"
                    )));
                }

                let mut row = vec![
                    target.to_string(),
                    entry.fields.name.clone().unwrap_or_else(|| entry.id.clone()),
                    entry.description().to_string(),
                ];
                if format == TocFormat::Toc {
                    row.push(entry.fields.short_description.clone().unwrap_or_default());
                }
                rows.insert(entry.id.clone(), row);
            }
            rows
        };

        self.table = Some((header, rows));
        Ok(())
    }

    /// Validate and freeze the tree.
    ///
    /// Fails with [`TocError::Aggregation`] listing every cross-file
    /// reference that could not be resolved. Entries are ordered by their
    /// `order` field, ties keeping declaration order.
    pub fn finalize(mut self) -> Result<Toc, TocError> {
        self.ingest()?;

        if !self.unresolved.is_empty() {
            return Err(TocError::Aggregation {
                fragment: self.source,
                unresolved: self.unresolved,
            });
        }

        let mut entries: Vec<TocEntry> = self
            .entries
            .take()
            .map(|entries| entries.into_values().collect())
            .unwrap_or_default();
        entries.sort_by_key(TocEntry::sort_key);

        let index: HashMap<String, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.id.clone(), i))
            .collect();

        let dfn: Option<Vec<DfnItem>> = self.dfn.map(|mut items| {
            entries
                .iter()
                .filter_map(|entry| items.swap_remove(&entry.id))
                .collect()
        });

        let table = self.table.map(|(header, mut rows)| Table {
            rows: entries
                .iter()
                .filter_map(|entry| rows.swap_remove(&entry.id))
                .collect(),
            ..Table::new(header)
        });

        tracing::debug!(
            "Finalized {} with {} entries",
            self.source.display(),
            entries.len()
        );

        Ok(Toc {
            kind: self.kind,
            source: self.source,
            entries,
            index,
            contents: self.contents,
            dfn,
            table,
        })
    }

    fn ingest(&mut self) -> Result<&IndexMap<String, TocEntry>, TocError> {
        if self.entries.is_none() {
            let entries = match self.kind.variant {
                TocVariant::Custom => self.ingest_custom()?,
                TocVariant::Aggregated => self.ingest_aggregated()?,
            };
            self.entries = Some(entries);
        }
        Ok(self.entries.get_or_insert_with(IndexMap::new))
    }

    fn ingest_custom(&self) -> Result<IndexMap<String, TocEntry>, TocError> {
        let fragment: Fragment = folio_yaml::ingest_yaml(&self.source)?;

        fragment
            .into_iter()
            .map(|(id, raw)| {
                let entry = TocEntry::resolve(&id, raw, &self.source, self.references)?;
                Ok((id, entry))
            })
            .collect()
    }

    fn ingest_aggregated(&mut self) -> Result<IndexMap<String, TocEntry>, TocError> {
        let refs: Vec<DriverRef> = folio_yaml::ingest_yaml_list(&self.source)?;
        let base = self.source.parent().unwrap_or(Path::new("")).to_path_buf();

        let mut fragments: HashMap<PathBuf, Option<Fragment>> = HashMap::new();
        let mut entries: IndexMap<String, TocEntry> = IndexMap::new();
        let mut unresolved = Vec::new();

        for r in refs {
            let path = base.join(&r.file);
            let fragment = match fragments.entry(path.clone()) {
                Entry::Occupied(e) => e.into_mut(),
                Entry::Vacant(e) => e.insert(load_optional(&path)?),
            };

            let Some(fragment) = fragment else {
                unresolved.push(r.label());
                continue;
            };

            let selected: Vec<(String, RawEntry)> = match &r.id {
                Some(id) => match fragment.get(id) {
                    Some(raw) => vec![(id.clone(), raw.clone())],
                    None => {
                        unresolved.push(r.label());
                        continue;
                    }
                },
                None => fragment
                    .iter()
                    .map(|(id, raw)| (id.clone(), raw.clone()))
                    .collect(),
            };

            for (id, raw) in selected {
                let entry = TocEntry::resolve(&id, raw, &path, self.references)?;
                if entries.insert(id.clone(), entry).is_some() {
                    tracing::debug!(
                        "Entry {} redefined by {}; keeping its first position",
                        id,
                        path.display()
                    );
                }
            }
        }

        self.unresolved = unresolved;
        Ok(entries)
    }
}

fn load_optional(path: &Path) -> Result<Option<Fragment>, TocError> {
    match folio_yaml::ingest_yaml(path) {
        Ok(fragment) => Ok(Some(fragment)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// A frozen, validated TOC.
#[derive(Debug, Clone)]
pub struct Toc {
    kind: TocKind,
    source: PathBuf,
    entries: Vec<TocEntry>,
    index: HashMap<String, usize>,
    contents: bool,
    dfn: Option<Vec<DfnItem>>,
    table: Option<Table>,
}

impl Toc {
    pub fn kind(&self) -> TocKind {
        self.kind
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All entries in output order.
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&TocEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contents view, if it was built.
    pub fn contents(&self) -> Option<&[TocEntry]> {
        self.contents.then_some(self.entries.as_slice())
    }

    /// Definition-list view, if it was built.
    pub fn dfn(&self) -> Option<&[DfnItem]> {
        self.dfn.as_deref()
    }

    /// Table view, if it was built.
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryFields;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const CUSTOM_TOC: TocKind = TocKind {
        variant: TocVariant::Custom,
        format: TocFormat::Toc,
    };
    const CUSTOM_REF: TocKind = TocKind {
        variant: TocVariant::Custom,
        format: TocFormat::Ref,
    };
    const AGGREGATED_TOC: TocKind = TocKind {
        variant: TocVariant::Aggregated,
        format: TocFormat::Toc,
    };

    fn fixture(files: &[(&str, &str)]) -> TempDir {
        let temp = tempdir().unwrap();
        for (name, body) in files {
            fs::write(temp.path().join(name), body).unwrap();
        }
        temp
    }

    fn ids(toc: &Toc) -> Vec<&str> {
        toc.entries().iter().map(|e| e.id.as_str()).collect()
    }

    const EXAMPLE: &str = "a:\n  ref: /a\n  description: A\nb:\n  ref: /b\n  description: B\n";

    #[test]
    fn custom_toc_lists_entries_in_file_order() {
        let temp = fixture(&[(
            "toc-steps.yaml",
            "zeta:\n  ref: /z\n  description: Z\nalpha:\n  ref: /a\n  description: A\nmid:\n  ref: /m\n  description: M\n",
        )]);
        let references = ReferenceSet::new();

        let mut builder =
            TocBuilder::new(temp.path().join("toc-steps.yaml"), CUSTOM_TOC, &references);
        builder.build_contents().unwrap();
        let toc = builder.finalize().unwrap();

        assert_eq!(ids(&toc), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn explicit_order_takes_precedence() {
        let temp = fixture(&[(
            "toc-steps.yaml",
            "a:\n  ref: /a\n  description: A\nb:\n  ref: /b\n  description: B\nc:\n  ref: /c\n  description: C\n  order: 1\n",
        )]);
        let references = ReferenceSet::new();

        let mut builder =
            TocBuilder::new(temp.path().join("toc-steps.yaml"), CUSTOM_TOC, &references);
        builder.build_contents().unwrap();
        let toc = builder.finalize().unwrap();

        assert_eq!(ids(&toc), vec!["c", "a", "b"]);
        assert_eq!(toc.get("a").unwrap().link(), "/a");
    }

    #[test]
    fn end_to_end_contents_dfn_and_table() {
        let temp = fixture(&[("toc-example.yaml", EXAMPLE), ("ref-toc-example.yaml", EXAMPLE)]);
        let references = ReferenceSet::new();

        let mut toc =
            TocBuilder::new(temp.path().join("toc-example.yaml"), CUSTOM_TOC, &references);
        toc.build_contents().unwrap();
        toc.build_dfn().unwrap();
        let toc = toc.finalize().unwrap();

        let links: Vec<_> = toc.contents().unwrap().iter().map(|e| e.link()).collect();
        assert_eq!(links, vec!["/a", "/b"]);
        let dfn = toc.dfn().unwrap();
        assert_eq!(dfn[1].definition, "B");
        assert!(toc.table().is_none());

        let mut refs = TocBuilder::new(
            temp.path().join("ref-toc-example.yaml"),
            CUSTOM_REF,
            &references,
        );
        refs.build_contents().unwrap();
        refs.build_table().unwrap();
        let refs = refs.finalize().unwrap();

        let table = refs.table().unwrap();
        assert_eq!(table.header, vec!["Ref", "Name", "Description"]);
        assert_eq!(
            table.rows,
            vec![vec!["/a", "a", "A"], vec!["/b", "b", "B"]]
        );
    }

    #[test]
    fn missing_shared_definition_fails_dfn_and_table() {
        let temp = fixture(&[(
            "toc-broken.yaml",
            "ok:\n  ref: /ok\n  description: fine\nbad:\n  ref: missing-ref\n",
        )]);
        let references = ReferenceSet::new();
        let path = temp.path().join("toc-broken.yaml");

        let err = TocBuilder::new(&path, CUSTOM_TOC, &references)
            .build_dfn()
            .unwrap_err();
        assert!(matches!(err, TocError::Resolution { ref reference, ref entry, .. }
            if reference == "missing-ref" && entry == "bad"));

        let err = TocBuilder::new(&path, CUSTOM_REF, &references)
            .build_table()
            .unwrap_err();
        assert!(err.to_string().contains("missing-ref"));
    }

    #[test]
    fn reference_entries_resolve_against_shared_set() {
        let temp = fixture(&[("toc-install.yaml", "linux:\n  ref: install-linux\n  order: 2\n")]);
        let mut references = ReferenceSet::new();
        references.insert(
            "install-linux",
            EntryFields {
                target: Some("/install/linux".to_string()),
                description: Some("Install on Linux".to_string()),
                ..Default::default()
            },
        );

        let mut builder =
            TocBuilder::new(temp.path().join("toc-install.yaml"), CUSTOM_REF, &references);
        builder.build_table().unwrap();
        let toc = builder.finalize().unwrap();

        assert_eq!(
            toc.table().unwrap().rows,
            vec![vec!["/install/linux", "linux", "Install on Linux"]]
        );
    }

    #[test]
    fn entry_without_ref_cannot_be_a_row() {
        let temp = fixture(&[("ref-toc-x.yaml", "lonely:\n  description: no ref here\n")]);
        let references = ReferenceSet::new();

        let err = TocBuilder::new(temp.path().join("ref-toc-x.yaml"), CUSTOM_REF, &references)
            .build_table()
            .unwrap_err();

        assert!(matches!(err, TocError::Mapping { ref entry, .. } if entry == "lonely"));
    }

    #[test]
    fn two_entries_with_one_ref_is_a_mapping_error() {
        let temp = fixture(&[(
            "ref-toc-x.yaml",
            "first:\n  ref: /same\n  description: one\nsecond:\n  ref: /same\n  description: two\n",
        )]);
        let references = ReferenceSet::new();

        let err = TocBuilder::new(temp.path().join("ref-toc-x.yaml"), CUSTOM_REF, &references)
            .build_table()
            .unwrap_err();

        assert!(matches!(err, TocError::Mapping { ref entry, .. } if entry == "second"));
        assert!(err.to_string().contains("first"));
    }

    #[test]
    fn phases_are_idempotent() {
        let temp = fixture(&[("ref-toc-example.yaml", EXAMPLE)]);
        let references = ReferenceSet::new();

        let mut builder = TocBuilder::new(
            temp.path().join("ref-toc-example.yaml"),
            CUSTOM_REF,
            &references,
        );
        builder.build_table().unwrap();
        builder.build_table().unwrap();
        builder.build_contents().unwrap();
        let toc = builder.finalize().unwrap();

        assert_eq!(toc.table().unwrap().rows.len(), 2);
        assert_eq!(toc.contents().unwrap().len(), 2);
    }

    #[test]
    fn duplicate_ids_keep_first_position_and_last_values() {
        let temp = fixture(&[
            (
                "toc-one.yaml",
                "x:\n  ref: /x\n  description: old\ny:\n  ref: /y\n  description: Y\n",
            ),
            ("toc-two.yaml", "x:\n  ref: /x\n  description: new\n"),
            (
                "toc-spec-all.yaml",
                "- file: toc-one.yaml\n- file: toc-two.yaml\n  id: x\n",
            ),
        ]);
        let references = ReferenceSet::new();

        let mut builder = TocBuilder::new(
            temp.path().join("toc-spec-all.yaml"),
            AGGREGATED_TOC,
            &references,
        );
        builder.build_dfn().unwrap();
        let toc = builder.finalize().unwrap();

        assert_eq!(ids(&toc), vec!["x", "y"]);
        assert_eq!(toc.get("x").unwrap().description(), "new");
        assert_eq!(toc.dfn().unwrap()[0].definition, "new");
        assert!(toc.get("x").unwrap().source.ends_with("toc-two.yaml"));
    }

    #[test]
    fn aggregation_reports_every_unresolved_reference() {
        let temp = fixture(&[
            ("toc-one.yaml", "x:\n  ref: /x\n  description: X\n"),
            (
                "toc-spec-all.yaml",
                "- file: toc-one.yaml\n  id: nope\n- file: toc-missing.yaml\n  id: a\n- file: toc-one.yaml\n  id: x\n- file: toc-one.yaml\n  id: also-nope\n",
            ),
        ]);
        let references = ReferenceSet::new();

        let mut builder = TocBuilder::new(
            temp.path().join("toc-spec-all.yaml"),
            AGGREGATED_TOC,
            &references,
        );
        builder.build_dfn().unwrap();
        let err = builder.finalize().unwrap_err();

        let TocError::Aggregation { unresolved, .. } = err else {
            panic!("expected aggregation error");
        };
        assert_eq!(
            unresolved,
            vec![
                "toc-one.yaml#nope",
                "toc-missing.yaml#a",
                "toc-one.yaml#also-nope"
            ]
        );
    }

    #[test]
    fn lists_driver_sources_once() {
        let temp = fixture(&[(
            "ref-spec-all.yaml",
            "- file: toc-one.yaml\n  id: a\n- file: toc-two.yaml\n- file: toc-one.yaml\n  id: b\n",
        )]);

        let sources = driver_sources(&temp.path().join("ref-spec-all.yaml")).unwrap();

        assert_eq!(
            sources,
            vec![temp.path().join("toc-one.yaml"), temp.path().join("toc-two.yaml")]
        );
    }
}
