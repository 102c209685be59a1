//! Installation snippets for the current release.
//!
//! `builddata/releases.yaml` lists the builds. Every source build gets curl,
//! untar and copy snippets; every subscription build gets a curl snippet.

use std::path::PathBuf;
use std::sync::Arc;

use folio_jobs::{Job, JobResult, PathList};
use serde::{Deserialize, Serialize};

use super::Outputs;
use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

const DATA_FILE: &str = "releases.yaml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseData {
    /// Builds such as `linux-x86_64`.
    #[serde(default)]
    pub source_files: Vec<String>,
    #[serde(default)]
    pub subscription_build: Vec<SubscriptionBuild>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SubscriptionBuild {
    pub system: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Values a release snippet template renders.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReleaseSnippet {
    pub base: String,
    pub platform: String,
    pub archive: String,
    pub product: String,
}

impl ReleaseSnippet {
    fn new(ctx: &BuildContext, build: &str, version: &str) -> Self {
        let releases = &ctx.config.releases;
        Self {
            base: releases.download_base.trim_end_matches('/').to_string(),
            platform: build.split('-').next().unwrap_or(build).to_string(),
            archive: format!("{}-{}-{}", releases.product, build, version),
            product: releases.product.clone(),
        }
    }
}

struct ReleaseArgs {
    ctx: Arc<BuildContext>,
    template: &'static str,
    snippet: ReleaseSnippet,
    target: PathBuf,
}

/// Snippet jobs for every build in the release data.
///
/// Yields nothing without a release data file, and fails when no release
/// version is configured.
pub fn jobs(ctx: &Arc<BuildContext>) -> Result<impl Iterator<Item = Job<Outputs>>, TaskError> {
    let data_file = ctx.config.builddata_dir().join(DATA_FILE);
    if !data_file.exists() {
        return Ok(Vec::new().into_iter());
    }

    let version = ctx
        .config
        .release_version()
        .ok_or_else(|| {
            TaskError::Config(
                "no release version: set version.release or version.published".to_string(),
            )
        })?
        .to_string();
    let data: ReleaseData = folio_yaml::ingest_yaml(&data_file)?;

    let includes = ctx.config.includes_dir();
    let mut dependencies = PathList::from(data_file.clone());
    dependencies.extend(ctx.config.config_file.clone());

    let mut specs: Vec<(&'static str, PathBuf, ReleaseSnippet)> = Vec::new();
    for build in &data.source_files {
        let snippet = ReleaseSnippet::new(ctx, build, &version);
        for (template, name) in [
            ("release-curl.rst", "curl"),
            ("release-untar.rst", "untar"),
            ("release-copy.rst", "copy"),
        ] {
            let target = includes.join(format!("install-{name}-release-{build}.rst"));
            specs.push((template, target, snippet.clone()));
        }
    }
    for sub in &data.subscription_build {
        let snippet = ReleaseSnippet::new(ctx, &format!("{}-{}", sub.kind, sub.system), &version);
        let target = includes.join(format!("install-curl-release-ent-{}.rst", sub.system));
        specs.push(("release-curl.rst", target, snippet));
    }

    let jobs: Vec<Job<Outputs>> = specs
        .into_iter()
        .map(|(template, target, snippet)| {
            Job::new(
                target.display().to_string(),
                generate_snippet,
                ReleaseArgs {
                    ctx: Arc::clone(ctx),
                    template,
                    snippet,
                    target: target.clone(),
                },
            )
            .target(target)
            .dependency(dependencies.clone())
        })
        .collect();

    Ok(jobs.into_iter())
}

fn generate_snippet(args: ReleaseArgs) -> JobResult<Outputs> {
    let rendered = args.ctx.templates.render(args.template, &args.snippet)?;
    Ok(vec![write_output(&args.target, &rendered)?])
}
