//! TOC variants selected by fragment file name.

use std::path::Path;

/// How a TOC fragment provides its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocVariant {
    /// The fragment defines its own entries.
    Custom,
    /// The fragment is a driver listing entries defined in other fragments.
    Aggregated,
}

/// Which secondary view a TOC produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TocFormat {
    /// Definition list of entries.
    Toc,
    /// Table of refs and descriptions.
    Ref,
}

/// Variant and format of a TOC fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocKind {
    pub variant: TocVariant,
    pub format: TocFormat,
}

/// File name prefixes, most specific first.
const PREFIXES: &[(&str, TocVariant, TocFormat)] = &[
    ("ref-spec-", TocVariant::Aggregated, TocFormat::Ref),
    ("toc-spec-", TocVariant::Aggregated, TocFormat::Toc),
    ("ref-toc-", TocVariant::Custom, TocFormat::Ref),
    ("toc-", TocVariant::Custom, TocFormat::Toc),
];

impl TocKind {
    /// Classify a fragment by file name and derive its output base name.
    ///
    /// | file name              | kind                | base name    |
    /// |------------------------|---------------------|--------------|
    /// | `toc-<name>.yaml`      | custom, toc         | `<name>`     |
    /// | `ref-toc-<name>.yaml`  | custom, ref         | `<name>`     |
    /// | `toc-spec-<name>.yaml` | aggregated, toc     | `spec-<name>`|
    /// | `ref-spec-<name>.yaml` | aggregated, ref     | `spec-<name>`|
    ///
    /// Returns `None` for files that are not TOC fragments.
    pub fn from_path(path: &Path) -> Option<(TocKind, String)> {
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;

        PREFIXES.iter().find_map(|(prefix, variant, format)| {
            let name = stem.strip_prefix(prefix).filter(|n| !n.is_empty())?;
            let kind = TocKind {
                variant: *variant,
                format: *format,
            };
            let base = match variant {
                TocVariant::Custom => name.to_string(),
                TocVariant::Aggregated => format!("spec-{name}"),
            };
            Some((kind, base))
        })
    }

    pub fn is_aggregated(&self) -> bool {
        self.variant == TocVariant::Aggregated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(name: &str) -> Option<(TocKind, String)> {
        TocKind::from_path(Path::new("/docs/source/includes").join(name).as_path())
    }

    #[test]
    fn classifies_custom_fragments() {
        assert_eq!(
            classify("toc-install.yaml"),
            Some((
                TocKind {
                    variant: TocVariant::Custom,
                    format: TocFormat::Toc
                },
                "install".to_string()
            ))
        );
        assert_eq!(
            classify("ref-toc-commands.yaml").map(|(k, b)| (k.format, b)),
            Some((TocFormat::Ref, "commands".to_string()))
        );
    }

    #[test]
    fn classifies_aggregated_fragments() {
        let (kind, base) = classify("ref-spec-admin.yaml").unwrap();
        assert!(kind.is_aggregated());
        assert_eq!(kind.format, TocFormat::Ref);
        assert_eq!(base, "spec-admin");

        let (kind, base) = classify("toc-spec-tutorials.yaml").unwrap();
        assert!(kind.is_aggregated());
        assert_eq!(kind.format, TocFormat::Toc);
        assert_eq!(base, "spec-tutorials");
    }

    #[test]
    fn ignores_other_files() {
        assert_eq!(classify("table-limits.yaml"), None);
        assert_eq!(classify("shared-install.yaml"), None);
        assert_eq!(classify("toc-.yaml"), None);
        assert_eq!(classify("toc-install.rst"), None);
    }
}
