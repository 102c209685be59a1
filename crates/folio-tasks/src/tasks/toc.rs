//! TOC fragments to toctree, definition-list and table outputs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_jobs::{Job, JobResult, PathList};
use folio_toc::{driver_sources, ReferenceSet, TocBuilder, TocFormat, TocKind, TocVariant};
use folio_yaml::{expand_tree, has_prefix};

use super::Outputs;
use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

/// Prefix of fragments holding shared definitions.
pub const SHARED_PREFIX: &str = "shared-";

/// Output directory for TOC files, relative to the includes directory.
const OUTPUT_DIR: &str = "toc";

struct TocArgs {
    ctx: Arc<BuildContext>,
    references: Arc<ReferenceSet>,
    source: PathBuf,
    kind: TocKind,
    base: String,
}

/// One job per TOC fragment under the includes directory.
///
/// Shared definitions are loaded up front and every job depends on them.
pub fn jobs(ctx: &Arc<BuildContext>) -> Result<impl Iterator<Item = Job<Outputs>>, TaskError> {
    let includes = ctx.config.includes_dir();
    let shared: Vec<PathBuf> = expand_tree(&includes, "yaml")
        .filter(|path| has_prefix(path, SHARED_PREFIX))
        .collect();
    let references = Arc::new(ReferenceSet::load(&shared)?);
    tracing::debug!("Loaded {} shared definitions", references.len());

    let ctx = Arc::clone(ctx);
    Ok(expand_tree(&includes, "yaml").filter_map(move |source| {
        let (kind, base) = TocKind::from_path(&source)?;

        let output_dir = includes.join(OUTPUT_DIR);
        let targets = output_paths(&output_dir, kind, &base);

        let mut dependencies: PathList = PathList::from(source.clone());
        dependencies.extend(shared.iter().cloned());
        if kind.is_aggregated() {
            // An unreadable driver fails inside the job.
            dependencies.extend(driver_sources(&source).unwrap_or_default());
        }

        let args = TocArgs {
            ctx: Arc::clone(&ctx),
            references: Arc::clone(&references),
            source: source.clone(),
            kind,
            base,
        };
        Some(
            Job::new(source.display().to_string(), generate_toc, args)
                .target(targets)
                .dependency(dependencies),
        )
    }))
}

/// Files a fragment of `kind` produces.
fn output_paths(output_dir: &Path, kind: TocKind, base: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if kind.variant == TocVariant::Custom {
        paths.push(output_dir.join(format!("{base}.rst")));
    }
    match kind.format {
        TocFormat::Toc => paths.push(output_dir.join(format!("dfn-list-{base}.rst"))),
        TocFormat::Ref => paths.push(output_dir.join(format!("table-{base}.rst"))),
    }
    paths
}

fn generate_toc(args: TocArgs) -> JobResult<Outputs> {
    let TocArgs {
        ctx,
        references,
        source,
        kind,
        base,
    } = args;

    let mut builder = TocBuilder::new(source.clone(), kind, &references);
    if kind.variant == TocVariant::Custom {
        builder.build_contents()?;
    }
    match kind.format {
        TocFormat::Toc => builder.build_dfn()?,
        TocFormat::Ref => builder.build_table()?,
    }
    let toc = builder.finalize()?;

    let output_dir = ctx.config.includes_dir().join(OUTPUT_DIR);
    let templates = &ctx.templates;
    let mut written = Vec::new();

    if let Some(contents) = toc.contents() {
        let path = output_dir.join(format!("{base}.rst"));
        written.push(write_output(&path, &templates.render_toctree(contents)?)?);
    }
    if let Some(dfn) = toc.dfn() {
        let path = output_dir.join(format!("dfn-list-{base}.rst"));
        written.push(write_output(&path, &templates.render_dfn_list(dfn)?)?);
    }
    if let Some(table) = toc.table() {
        let path = output_dir.join(format!("table-{base}.rst"));
        written.push(write_output(&path, &templates.render_table(table)?)?);
    }

    tracing::info!("Compiled {} entries from {}", toc.len(), source.display());
    Ok(written)
}
