//! Step files (`step-<name>.yaml`) to numbered procedures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_jobs::{Job, JobResult};
use folio_yaml::{expand_tree, file_stem, has_prefix};
use serde::{Deserialize, Serialize};

use super::Outputs;
use crate::context::{write_output, BuildContext};

const PREFIX: &str = "step-";

/// One step of a procedure. A step file holds one document per step.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Step {
    pub title: String,
    /// Explicit position; steps without one keep file order.
    #[serde(default)]
    pub stepnum: Option<u32>,
    #[serde(default)]
    pub pre: Option<String>,
    #[serde(default)]
    pub action: Option<StepAction>,
    #[serde(default)]
    pub post: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StepAction {
    #[serde(default = "default_language")]
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub pre: Option<String>,
}

fn default_language() -> String {
    "sh".to_string()
}

#[derive(Serialize)]
struct NumberedStep {
    number: usize,
    underline: String,
    #[serde(flatten)]
    step: Step,
}

pub fn jobs(ctx: &Arc<BuildContext>) -> impl Iterator<Item = Job<Outputs>> {
    let ctx = Arc::clone(ctx);
    expand_tree(&ctx.config.includes_dir(), "yaml")
        .filter(|path| has_prefix(path, PREFIX))
        .map(move |source| {
            let target = output_path(&source);
            Job::new(
                source.display().to_string(),
                generate_steps,
                (Arc::clone(&ctx), source.clone(), target.clone()),
            )
            .target(target)
            .dependency(source)
        })
}

/// `<dir>/step-<name>.yaml` to `<dir>/steps/<name>.rst`.
fn output_path(source: &Path) -> PathBuf {
    let name = file_stem(source).trim_start_matches(PREFIX);
    source
        .parent()
        .unwrap_or(Path::new(""))
        .join("steps")
        .join(format!("{name}.rst"))
}

fn number(mut steps: Vec<Step>) -> Vec<NumberedStep> {
    steps.sort_by_key(|s| s.stepnum.unwrap_or(u32::MAX));
    steps
        .into_iter()
        .enumerate()
        .map(|(i, step)| {
            let number = i + 1;
            let heading = format!("Step {}: {}", number, step.title);
            NumberedStep {
                number,
                underline: "-".repeat(heading.chars().count()),
                step,
            }
        })
        .collect()
}

fn generate_steps(
    (ctx, source, target): (Arc<BuildContext>, PathBuf, PathBuf),
) -> JobResult<Outputs> {
    let steps: Vec<Step> = folio_yaml::ingest_yaml_list(&source)?;
    let rendered = ctx
        .templates
        .render("steps.rst", minijinja::context! { steps => number(steps) })?;

    Ok(vec![write_output(&target, &rendered)?])
}
