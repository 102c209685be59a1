//! Site files written on demand: `.htaccess`, `robots.txt`, build info and
//! the include overview.

use std::path::PathBuf;

use anyhow::Result;
use folio_tasks::tasks::{hash, htaccess, includes, robots};

use super::build::Settings;

/// Regenerate the redirect file, defaulting to `paths.htaccess`.
pub fn htaccess(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    let ctx = settings.context()?;
    let output = output.unwrap_or_else(|| ctx.config.htaccess_file());

    htaccess::write_htaccess(&ctx, &output)?;
    Ok(())
}

/// Regenerate `robots.txt`, overriding the branch guard.
pub fn robots(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    let ctx = settings.context()?;
    let output = output.unwrap_or_else(|| ctx.config.robots_file());

    robots::write_robots(&ctx, &output, true)?;
    Ok(())
}

pub fn hash(settings: &Settings) -> Result<()> {
    let ctx = settings.context()?;

    for path in hash::write_buildinfo(&ctx)? {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn includes(settings: &Settings) -> Result<()> {
    let ctx = settings.context()?;

    let path = includes::write_include_index(&ctx)?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn robots_command_writes_off_primary_branch() {
        let temp = tempdir().unwrap();
        let config = temp.path().join("folio.toml");
        fs::write(&config, "[git.branches]\ncurrent = \"feature\"\n").unwrap();
        fs::create_dir_all(temp.path().join("config")).unwrap();
        fs::write(temp.path().join("config/robots.yaml"), "file: /drafts\n").unwrap();
        let settings = Settings {
            config,
            force: false,
            jobs: None,
        };

        robots(&settings, None).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("build/public/robots.txt")).unwrap(),
            "User-agent: *\nDisallow: /drafts\n"
        );
    }
}
