//! Build information: the commit substitution and `release.txt`.

use crate::context::{write_output, BuildContext};
use crate::error::TaskError;
use crate::tasks::Outputs;

/// Write `includes/hash.rst` and `<public site>/release.txt` for the
/// configured commit.
pub fn write_buildinfo(ctx: &BuildContext) -> Result<Outputs, TaskError> {
    let commit = ctx.config.git.commit.trim();
    if commit.is_empty() {
        return Err(TaskError::Config("git.commit is not set".to_string()));
    }

    let hash_file = ctx.config.includes_dir().join("hash.rst");
    let rendered = ctx
        .templates
        .render("hash.rst", minijinja::context! { commit => commit })?;

    let written = vec![
        write_output(&hash_file, &rendered)?,
        write_output(&ctx.config.public_site_dir().join("release.txt"), commit)?,
    ];

    tracing::info!("Generated build info for commit {}", commit);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_hash_and_release_files() {
        let temp = tempdir().unwrap();
        let mut config = BuildConfig::with_root(temp.path());
        config.git.commit = "3f2a9c1".to_string();
        let ctx = BuildContext::new(config);

        let written = write_buildinfo(&ctx).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            fs::read_to_string(&written[0]).unwrap(),
            ".. |commit| replace:: ``3f2a9c1``\n"
        );
        assert_eq!(
            fs::read_to_string(temp.path().join("build/public/release.txt")).unwrap(),
            "3f2a9c1"
        );
    }

    #[test]
    fn missing_commit_is_a_config_error() {
        let temp = tempdir().unwrap();
        let ctx = BuildContext::new(BuildConfig::with_root(temp.path()));

        assert!(matches!(write_buildinfo(&ctx), Err(TaskError::Config(_))));
    }
}
