//! Overview page of include files and the pages that pull them in.
//!
//! Every `.rst` file under the includes directory is listed with its
//! description from `builddata/includes.yaml` and the source pages whose
//! `.. include::` directives name it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use folio_yaml::expand_tree;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

const DATA_FILE: &str = "includes.yaml";

/// Directory under the includes directory holding the overview itself.
const GENERATED_DIR: &str = "generated";

/// Source page extensions scanned for include directives.
const PAGE_EXTENSIONS: &[&str] = &["txt", "rst"];

static INCLUDE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*\.\. (?:literal)?include:: (\S+)").expect("include pattern is valid")
});

#[derive(Debug, Clone, Deserialize)]
struct Description {
    file: String,
    description: String,
}

/// One include file and the pages that use it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IncludeFile {
    /// Path as written in an include directive, e.g. `/includes/toc/admin.rst`.
    pub file: String,
    pub description: Option<String>,
    pub included_in: Vec<String>,
}

/// A section of the overview page.
#[derive(Debug, Serialize)]
struct Section<'a> {
    heading: String,
    underline: String,
    description: Option<&'a str>,
    /// Document names of the including pages, without extension.
    pages: Vec<&'a str>,
}

impl<'a> From<&'a IncludeFile> for Section<'a> {
    fn from(file: &'a IncludeFile) -> Self {
        let heading = format!("``{}``", file.file);
        Section {
            underline: "-".repeat(heading.chars().count()),
            heading,
            description: file.description.as_deref(),
            pages: file
                .included_in
                .iter()
                .map(|page| page.rsplit_once('.').map_or(page.as_str(), |(doc, _)| doc))
                .collect(),
        }
    }
}

/// Collect every include file with its users, sorted by path.
pub fn include_file_data(ctx: &BuildContext) -> Result<Vec<IncludeFile>, TaskError> {
    let source = ctx.config.source_dir();
    let includes = ctx.config.includes_dir();
    let generated = includes.join(GENERATED_DIR);

    let mut files: BTreeMap<String, IncludeFile> = expand_tree(&includes, "rst")
        .filter(|path| !path.starts_with(&generated))
        .map(|path| {
            let file = site_path(&source, &path);
            let entry = IncludeFile {
                file: file.clone(),
                description: None,
                included_in: Vec::new(),
            };
            (file, entry)
        })
        .collect();

    let data_file = ctx.config.builddata_dir().join(DATA_FILE);
    if data_file.exists() {
        let descriptions: Vec<Description> = folio_yaml::ingest_yaml_list(&data_file)?;
        for Description { file, description } in descriptions {
            match files.get_mut(&file) {
                Some(entry) => entry.description = Some(description),
                None => tracing::warn!("{}: no include file {}", data_file.display(), file),
            }
        }
    }

    for ext in PAGE_EXTENSIONS {
        for page in expand_tree(&source, ext) {
            if page.starts_with(&generated) {
                continue;
            }
            let content = fs::read_to_string(&page).map_err(|err| TaskError::Read {
                path: page.clone(),
                source: err,
            })?;
            let user = site_path(&source, &page);

            for caps in INCLUDE_DIRECTIVE.captures_iter(&content) {
                if let Some(entry) = files.get_mut(&caps[1]) {
                    entry.included_in.push(user.clone());
                }
            }
        }
    }

    Ok(files
        .into_values()
        .map(|mut entry| {
            entry.included_in.sort();
            entry.included_in.dedup();
            entry
        })
        .collect())
}

/// Path of `file` as seen from the site root: relative to the source
/// directory with a leading `/`.
fn site_path(source: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(source).unwrap_or(file);
    let joined: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    format!("/{}", joined.join("/"))
}

/// Write `includes/generated/overview.rst`.
pub fn write_include_index(ctx: &BuildContext) -> Result<PathBuf, TaskError> {
    let files = include_file_data(ctx)?;
    let sections: Vec<Section> = files.iter().map(Section::from).collect();
    let rendered = ctx
        .templates
        .render("includes.rst", minijinja::context! { files => sections })?;

    let output = ctx
        .config
        .includes_dir()
        .join(GENERATED_DIR)
        .join("overview.rst");
    let written = write_output(&output, &rendered)?;

    tracing::info!("Indexed {} include files", files.len());
    Ok(written)
}
