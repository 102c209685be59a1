//! Redirect rules (`builddata/htaccess*.yaml`) to an `.htaccess` file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_jobs::{Job, JobResult};
use folio_yaml::{expand_tree, has_prefix};
use serde::Deserialize;

use super::Outputs;
use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

const PREFIX: &str = "htaccess";
const OUTPUT_PLACEHOLDER: &str = "{{output}}";

const CORS_FOOTER: &str = r#"<FilesMatch "\.(ttf|otf|eot|woff)$">
   Header set Access-Control-Allow-Origin "*"
</FilesMatch>
"#;

/// One redirect rule.
///
/// With `outputs`, the rule is emitted once per output with
/// `{{output}}` in `from` and `to` replaced by it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Redirect {
    #[serde(default = "default_code")]
    pub code: u16,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub outputs: Vec<String>,
}

fn default_code() -> u16 {
    301
}

impl Redirect {
    /// `Redirect` lines for this rule.
    pub fn lines(&self) -> Vec<String> {
        if self.outputs.is_empty() {
            return vec![self.line(&self.from, &self.to)];
        }

        self.outputs
            .iter()
            .map(|output| {
                self.line(
                    &self.from.replace(OUTPUT_PLACEHOLDER, output),
                    &self.to.replace(OUTPUT_PLACEHOLDER, output),
                )
            })
            .collect()
    }

    fn line(&self, from: &str, to: &str) -> String {
        format!("Redirect {} {} {}", self.code, from, to)
    }
}

/// Redirect source files, in walk order.
pub fn sources(ctx: &BuildContext) -> Vec<PathBuf> {
    expand_tree(&ctx.config.builddata_dir(), "yaml")
        .filter(|path| has_prefix(path, PREFIX))
        .collect()
}

/// Render the `.htaccess` body: sorted unique redirects, then the CORS
/// block for web fonts.
pub fn render(redirects: &[Redirect]) -> String {
    let lines: BTreeSet<String> = redirects.iter().flat_map(Redirect::lines).collect();

    let mut out = String::new();
    for line in &lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    out.push_str(CORS_FOOTER);
    out
}

/// A single job writing `output` from every redirect file.
///
/// Yields nothing when there are no redirect files.
pub fn jobs(ctx: &Arc<BuildContext>, output: &Path) -> impl Iterator<Item = Job<Outputs>> {
    let sources = sources(ctx);
    let job = (!sources.is_empty()).then(|| {
        Job::new(
            output.display().to_string(),
            generate_htaccess,
            (sources.clone(), output.to_path_buf()),
        )
        .target(output)
        .dependency(sources)
    });
    job.into_iter()
}

/// Write `output` immediately, regardless of staleness.
pub fn write_htaccess(ctx: &BuildContext, output: &Path) -> Result<PathBuf, TaskError> {
    write_redirects(&sources(ctx), output)
}

fn write_redirects(sources: &[PathBuf], output: &Path) -> Result<PathBuf, TaskError> {
    let mut redirects = Vec::new();
    for source in sources {
        redirects.extend(folio_yaml::ingest_yaml_list::<Redirect>(source)?);
    }
    let written = write_output(output, &render(&redirects))?;

    tracing::info!(
        "Regenerated {} with {} redirects",
        output.display(),
        redirects.len()
    );
    Ok(written)
}

fn generate_htaccess((sources, output): (Vec<PathBuf>, PathBuf)) -> JobResult<Outputs> {
    Ok(vec![write_redirects(&sources, &output)?])
}
