//! Program option definitions to `option/<program>-<name>.rst` snippets.
//!
//! Definitions live in `option-*.yaml` files or under the `option/`
//! directory of the includes. A later definition of the same program and
//! option replaces an earlier one.

use std::path::PathBuf;
use std::sync::Arc;

use folio_jobs::{Job, JobResult};
use folio_yaml::{expand_tree, has_prefix};
use indexmap::IndexMap;
use serde::Deserialize;

use super::Outputs;
use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

const PREFIX: &str = "option-";
const OUTPUT_DIR: &str = "option";

/// One command-line option of a program.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OptionDef {
    pub program: String,
    pub name: String,
    #[serde(default = "default_directive")]
    pub directive: String,
    #[serde(default)]
    pub args: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

fn default_directive() -> String {
    "option".to_string()
}

impl OptionDef {
    /// Directive argument, e.g. `--port <port>`.
    pub fn signature(&self) -> String {
        match &self.args {
            Some(args) => format!("{} {}", self.name, args),
            None => self.name.clone(),
        }
    }

    /// Output file name without directory.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.rst",
            self.program,
            self.name.trim_start_matches('-')
        )
    }
}

/// Definitions keyed by program and option name, with their source file.
pub type OptionMap = IndexMap<(String, String), (OptionDef, PathBuf)>;

/// Load every option definition, in first-seen order.
pub fn load_options(ctx: &BuildContext) -> Result<OptionMap, TaskError> {
    let includes = ctx.config.includes_dir();
    let option_dir = includes.join(OUTPUT_DIR);

    let mut options = IndexMap::new();
    for source in expand_tree(&includes, "yaml")
        .filter(|path| path.starts_with(&option_dir) || has_prefix(path, PREFIX))
    {
        let defs: Vec<OptionDef> = folio_yaml::ingest_yaml_list(&source)?;
        for def in defs {
            let key = (def.program.clone(), def.name.clone());
            options.insert(key, (def, source.clone()));
        }
    }
    Ok(options)
}

/// One job per option.
///
/// Jobs carry no target and always run; each depends on the file that
/// defined its option.
pub fn jobs(ctx: &Arc<BuildContext>) -> Result<impl Iterator<Item = Job<Outputs>>, TaskError> {
    let options = load_options(ctx)?;
    let output_dir = ctx.config.includes_dir().join(OUTPUT_DIR);
    let ctx = Arc::clone(ctx);

    Ok(options.into_values().map(move |(def, source)| {
        let target = output_dir.join(def.file_name());
        Job::new(
            format!("{} {}", def.program, def.name),
            render_option,
            (Arc::clone(&ctx), def, target),
        )
        .dependency(source)
    }))
}

fn render_option(
    (ctx, def, target): (Arc<BuildContext>, OptionDef, PathBuf),
) -> JobResult<Outputs> {
    let rendered = ctx.templates.render(
        "option.rst",
        minijinja::context! {
            program => &def.program,
            directive => &def.directive,
            signature => def.signature(),
            description => &def.description,
            default => &def.default,
            kind => &def.kind,
        },
    )?;

    Ok(vec![write_output(&target, &rendered)?])
}
