//! Source tree walking.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Lazily yield every file under `root` with the given extension.
///
/// Entries are visited in file-name order so job streams are deterministic.
/// A missing root yields nothing.
pub fn expand_tree(root: &Path, extension: &str) -> impl Iterator<Item = PathBuf> {
    let extension = extension.to_string();

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(move |path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == extension)
        })
}

/// File name without its extension, or an empty string.
pub fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// Whether the file name of `path` starts with `prefix`.
pub fn has_prefix(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(prefix))
}
