//! Table fragments (`table-<name>.yaml`) to list tables.
//!
//! Each fragment produces `table/<name>.rst` and a `table/<name>-list.rst`
//! copy next to its source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_jobs::{Job, JobResult};
use folio_toc::TableFragment;
use folio_yaml::{expand_tree, file_stem, has_prefix};

use super::Outputs;
use crate::context::{write_output, BuildContext};

const PREFIX: &str = "table-";

/// One job per table fragment under the includes directory.
pub fn jobs(ctx: &Arc<BuildContext>) -> impl Iterator<Item = Job<Outputs>> {
    let ctx = Arc::clone(ctx);
    expand_tree(&ctx.config.includes_dir(), "yaml")
        .filter(|path| has_prefix(path, PREFIX))
        .map(move |source| {
            let targets = output_paths(&source);
            Job::new(
                source.display().to_string(),
                generate_table,
                (Arc::clone(&ctx), source.clone(), targets.clone()),
            )
            .target(targets)
            .dependency(source)
        })
}

/// `<dir>/table-<name>.yaml` to `<dir>/table/<name>.rst` and
/// `<dir>/table/<name>-list.rst`.
fn output_paths(source: &Path) -> Vec<PathBuf> {
    let name = file_stem(source).trim_start_matches(PREFIX);
    let dir = source.parent().unwrap_or(Path::new("")).join("table");
    vec![
        dir.join(format!("{name}.rst")),
        dir.join(format!("{name}-list.rst")),
    ]
}

fn generate_table(
    (ctx, source, targets): (Arc<BuildContext>, PathBuf, Vec<PathBuf>),
) -> JobResult<Outputs> {
    let table = TableFragment::load(&source)?.into_table()?;
    let rendered = ctx.templates.render_table(&table)?;

    let mut written = Vec::with_capacity(targets.len());
    for target in &targets {
        written.push(write_output(target, &rendered)?);
    }

    tracing::info!("Rendered table {}", source.display());
    Ok(written)
}
