//! `robots.txt` generation from `builddata/robots.yaml`.

use std::path::Path;

use serde::Deserialize;

use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

const DATA_FILE: &str = "robots.yaml";
const PUBLISHED: &str = "{{published}}";

/// A page to hide from crawlers, optionally under several branches.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Suppressed {
    pub file: String,
    #[serde(default)]
    pub branches: Option<Vec<String>>,
}

/// Render `robots.txt`. The `{{published}}` branch stands for every
/// published branch.
pub fn render(records: &[Suppressed], published: &[String]) -> String {
    let mut out = String::from("User-agent: *\n");

    for record in records {
        let Some(branches) = &record.branches else {
            out.push_str(&format!("Disallow: {}\n", record.file));
            continue;
        };

        for branch in branches {
            if branch == PUBLISHED {
                for name in published {
                    out.push_str(&format!("Disallow: /{}{}\n", name, record.file));
                }
            } else {
                out.push_str(&format!("Disallow: /{}{}\n", branch, record.file));
            }
        }
    }
    out
}

/// Write `robots.txt` to `output`.
///
/// Only runs on the primary branch unless `override_branch` is set.
/// Returns whether the file was written.
pub fn write_robots(
    ctx: &BuildContext,
    output: &Path,
    override_branch: bool,
) -> Result<bool, TaskError> {
    if override_branch {
        tracing::info!("Regenerating robots.txt with branch override");
    } else if !ctx.config.on_primary_branch() {
        tracing::warn!(
            "Refusing to regenerate robots.txt on branch {}",
            ctx.config.git.branches.current
        );
        return Ok(false);
    }

    let records: Vec<Suppressed> =
        folio_yaml::ingest_yaml_list(&ctx.config.builddata_dir().join(DATA_FILE))?;
    write_output(output, &render(&records, &ctx.config.git.branches.published))?;

    tracing::info!("Regenerated {}", output.display());
    Ok(true)
}

/// Regenerate the public site's `robots.txt` during a full build.
///
/// Skipped when there is no `robots.yaml` or when off the primary branch.
pub fn refresh_robots(ctx: &BuildContext) -> Result<bool, TaskError> {
    if !ctx.config.builddata_dir().join(DATA_FILE).exists() {
        return Ok(false);
    }
    write_robots(ctx, &ctx.config.robots_file(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::tasks::tests::write;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn expands_published_branches() {
        let records = vec![
            Suppressed {
                file: "/drafts".to_string(),
                branches: None,
            },
            Suppressed {
                file: "/internal".to_string(),
                branches: Some(vec!["{{published}}".to_string(), "dev".to_string()]),
            },
        ];
        let published = vec!["v2.4".to_string(), "v2.6".to_string()];

        assert_eq!(
            render(&records, &published),
            "User-agent: *\nDisallow: /drafts\nDisallow: /v2.4/internal\nDisallow: /v2.6/internal\nDisallow: /dev/internal\n"
        );
    }

    #[test]
    fn refuses_off_primary_branch_without_override() {
        let temp = tempdir().unwrap();
        let mut config = BuildConfig::with_root(temp.path());
        config.git.branches.current = "feature".to_string();
        let ctx = BuildContext::new(config);
        write(&ctx.config.builddata_dir().join(DATA_FILE), "file: /drafts\n");
        let output = temp.path().join("build/robots.txt");

        assert!(!write_robots(&ctx, &output, false).unwrap());
        assert!(!output.exists());

        assert!(write_robots(&ctx, &output, true).unwrap());
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "User-agent: *\nDisallow: /drafts\n"
        );
    }

    #[test]
    fn build_refresh_needs_data_and_primary_branch() {
        let temp = tempdir().unwrap();
        let mut config = BuildConfig::with_root(temp.path());
        let ctx = BuildContext::new(config.clone());

        assert!(!refresh_robots(&ctx).unwrap());

        write(&ctx.config.builddata_dir().join(DATA_FILE), "file: /drafts\n");
        assert!(refresh_robots(&ctx).unwrap());
        assert!(temp.path().join("build/public/robots.txt").exists());

        config.git.branches.current = "feature".to_string();
        fs::remove_file(temp.path().join("build/public/robots.txt")).unwrap();
        assert!(!refresh_robots(&BuildContext::new(config)).unwrap());
        assert!(!temp.path().join("build/public/robots.txt").exists());
    }
}
