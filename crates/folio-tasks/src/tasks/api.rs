//! API parameter files to parameter tables.
//!
//! Every `.yaml` file under the reference directory is a list of parameter
//! records; the table is written next to it with an `.rst` extension.

use std::path::PathBuf;
use std::sync::Arc;

use folio_jobs::{Job, JobResult};
use folio_toc::Table;
use folio_yaml::expand_tree;
use serde::Deserialize;

use super::Outputs;
use crate::context::{write_output, BuildContext};

/// A documented parameter or field.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub optional: bool,
    /// Position in the table; unpositioned parameters go last.
    #[serde(default)]
    pub position: Option<u32>,
}

pub fn jobs(ctx: &Arc<BuildContext>) -> impl Iterator<Item = Job<Outputs>> {
    let ctx = Arc::clone(ctx);
    expand_tree(&ctx.config.reference_dir(), "yaml").map(move |source| {
        let target = source.with_extension("rst");
        Job::new(
            source.display().to_string(),
            generate_params,
            (Arc::clone(&ctx), source.clone(), target.clone()),
        )
        .target(target)
        .dependency(source)
    })
}

/// Project parameters into a three-column table, ordered by position.
pub fn param_table(mut params: Vec<Param>) -> Table {
    params.sort_by_key(|p| p.position.unwrap_or(u32::MAX));

    let mut table = Table::new(vec![
        "Parameter".to_string(),
        "Type".to_string(),
        "Description".to_string(),
    ]);
    table.widths = Some(vec![20, 20, 60]);
    table.rows = params
        .into_iter()
        .map(|p| {
            let description = if p.optional {
                format!("Optional. {}", p.description)
            } else {
                p.description
            };
            vec![
                format!("``{}``", p.name),
                p.kind.unwrap_or_default(),
                description,
            ]
        })
        .collect();
    table
}

fn generate_params(
    (ctx, source, target): (Arc<BuildContext>, PathBuf, PathBuf),
) -> JobResult<Outputs> {
    let params: Vec<Param> = folio_yaml::ingest_yaml_list(&source)?;
    let count = params.len();
    let rendered = ctx.templates.render_table(&param_table(params))?;

    let written = write_output(&target, &rendered)?;
    tracing::info!("Rendered {} parameters for {}", count, source.display());
    Ok(vec![written])
}
