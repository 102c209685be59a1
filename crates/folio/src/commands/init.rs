//! Scaffold a folio project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Files created by `folio init`, relative to the config file's directory.
const SCAFFOLD: &[(&str, &str)] = &[
    ("source/includes/shared-install.yaml", DEFAULT_SHARED),
    ("source/includes/toc-install.yaml", DEFAULT_TOC),
    ("source/includes/ref-spec-install.yaml", DEFAULT_DRIVER),
    ("source/includes/table-requirements.yaml", DEFAULT_TABLE),
    ("source/includes/step-install.yaml", DEFAULT_STEPS),
    ("config/htaccess.yaml", DEFAULT_REDIRECTS),
];

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing folio...");

    let root = config_path.parent().unwrap_or(Path::new(""));

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    for (relative, content) in SCAFFOLD {
        let path = root.join(relative);
        if path.exists() && !yes {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {relative}"))?;
        tracing::info!("Created {}", relative);
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'folio build' to generate includes.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Folio Configuration

[paths]
# Project root; relative paths are resolved against this file
projectroot = "."
source = "source"
includes = "source/includes"
images = "source/images"
reference = "source/reference"
builddata = "config"
public_site_output = "build/public"

[version]
release = "1.0.0"
published = ["1.0"]

[git]
commit = ""

[git.branches]
current = "master"
published = ["master"]

[images]
# Placeholders: {source} {target} {dpi} {width}
converter = "inkscape -z -d {dpi} -w {width} -y 0.0 -e {target} {source}"

[releases]
download_base = "https://downloads.example.com"
product = "release"

[build]
# Worker threads for the job runner
jobs = 1
"#;

const DEFAULT_SHARED: &str = r#"install-linux:
  ref: /tutorial/install-on-linux
  name: Install on Linux
  description: Install from the binary archive on Linux systems.
"#;

const DEFAULT_TOC: &str = r#"linux:
  ref: install-linux
  order: 1
windows:
  ref: /tutorial/install-on-windows
  name: Install on Windows
  description: Install from the MSI package on Windows.
  order: 2
"#;

const DEFAULT_DRIVER: &str = r#"- file: toc-install.yaml
"#;

const DEFAULT_TABLE: &str = r#"title: Requirements
header: [Platform, Minimum]
rows:
  - [Linux, kernel 3.10]
  - [Windows, Server 2012]
widths: [40, 60]
"#;

const DEFAULT_STEPS: &str = r#"title: Download the archive
action:
  language: sh
  code: curl -O https://downloads.example.com/linux/release-linux-x86_64-1.0.0.tgz
---
title: Extract the files
action:
  code: tar -zxvf release-linux-x86_64-1.0.0.tgz
"#;

const DEFAULT_REDIRECTS: &str = r#"from: /install
to: /tutorial/install-on-linux
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build::load_config;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_a_loadable_project() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("folio.toml");

        run(&config_path, false).unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.release_version(), Some("1.0.0"));
        for (relative, _) in SCAFFOLD {
            assert!(temp.path().join(relative).exists(), "{relative} missing");
        }
    }

    #[test]
    fn scaffold_builds_cleanly() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("folio.toml");
        run(&config_path, false).unwrap();

        let ctx = folio_tasks::BuildContext::new(load_config(&config_path).unwrap());
        let executed = folio_tasks::build_all(&ctx, &folio_jobs::Runner::new()).unwrap();

        // toc, aggregated toc, table, steps, htaccess
        assert_eq!(executed, 5);
        assert!(temp.path().join("source/includes/toc/table-spec-install.rst").exists());
    }

    #[test]
    fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("folio.toml");
        fs::write(&config_path, "# mine\n").unwrap();

        run(&config_path, false).unwrap();

        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
        assert!(!temp.path().join("source").exists());
    }
}
