//! Build configuration (`folio.toml`).

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Project configuration shared by every task.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BuildConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub version: VersionConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub releases: ReleasesConfig,
    #[serde(default)]
    pub build: BuildSettings,

    /// File the configuration was loaded from, if any.
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

/// Project layout. Every path except `projectroot` is relative to it.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_projectroot")]
    pub projectroot: PathBuf,
    #[serde(default = "default_source")]
    pub source: PathBuf,
    #[serde(default = "default_includes")]
    pub includes: PathBuf,
    #[serde(default = "default_images")]
    pub images: PathBuf,
    #[serde(default = "default_reference")]
    pub reference: PathBuf,
    #[serde(default = "default_builddata")]
    pub builddata: PathBuf,
    #[serde(default = "default_public_site_output")]
    pub public_site_output: PathBuf,
    #[serde(default = "default_htaccess")]
    pub htaccess: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            projectroot: default_projectroot(),
            source: default_source(),
            includes: default_includes(),
            images: default_images(),
            reference: default_reference(),
            builddata: default_builddata(),
            public_site_output: default_public_site_output(),
            htaccess: default_htaccess(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct VersionConfig {
    /// Version being released; falls back to the first published version.
    pub release: Option<String>,
    #[serde(default)]
    pub published: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GitConfig {
    /// Commit the build is made from.
    #[serde(default)]
    pub commit: String,
    #[serde(default)]
    pub branches: BranchesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchesConfig {
    #[serde(default = "default_branch")]
    pub current: String,
    #[serde(default)]
    pub published: Vec<String>,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        Self {
            current: default_branch(),
            published: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// Shell command converting one SVG to PNG. Placeholders: `{source}`,
    /// `{target}`, `{dpi}`, `{width}`.
    #[serde(default = "default_converter")]
    pub converter: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            converter: default_converter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleasesConfig {
    /// Base URL release archives are downloaded from.
    #[serde(default)]
    pub download_base: String,
    /// Archive name prefix, as in `<product>-<build>-<version>.tgz`.
    #[serde(default = "default_product")]
    pub product: String,
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        Self {
            download_base: String::new(),
            product: default_product(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildSettings {
    /// Worker threads for the job runner.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
        }
    }
}

fn default_projectroot() -> PathBuf {
    PathBuf::from(".")
}
fn default_source() -> PathBuf {
    PathBuf::from("source")
}
fn default_includes() -> PathBuf {
    PathBuf::from("source/includes")
}
fn default_images() -> PathBuf {
    PathBuf::from("source/images")
}
fn default_reference() -> PathBuf {
    PathBuf::from("source/reference")
}
fn default_builddata() -> PathBuf {
    PathBuf::from("config")
}
fn default_public_site_output() -> PathBuf {
    PathBuf::from("build/public")
}
fn default_htaccess() -> PathBuf {
    PathBuf::from("build/public/.htaccess")
}
fn default_branch() -> String {
    "master".to_string()
}
fn default_converter() -> String {
    "inkscape -z -d {dpi} -w {width} -y 0.0 -e {target} {source}".to_string()
}
fn default_product() -> String {
    "release".to_string()
}
fn default_jobs() -> usize {
    1
}

impl BuildConfig {
    /// Default configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.paths.projectroot = root.into();
        config
    }

    pub fn root(&self) -> &Path {
        &self.paths.projectroot
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root().join(&self.paths.source)
    }

    pub fn includes_dir(&self) -> PathBuf {
        self.root().join(&self.paths.includes)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root().join(&self.paths.images)
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.root().join(&self.paths.reference)
    }

    pub fn builddata_dir(&self) -> PathBuf {
        self.root().join(&self.paths.builddata)
    }

    pub fn public_site_dir(&self) -> PathBuf {
        self.root().join(&self.paths.public_site_output)
    }

    pub fn htaccess_file(&self) -> PathBuf {
        self.root().join(&self.paths.htaccess)
    }

    pub fn robots_file(&self) -> PathBuf {
        self.public_site_dir().join("robots.txt")
    }

    /// Version the release snippets are generated for.
    pub fn release_version(&self) -> Option<&str> {
        self.version
            .release
            .as_deref()
            .or_else(|| self.version.published.first().map(String::as_str))
    }

    /// Whether the current branch is the primary branch.
    pub fn on_primary_branch(&self) -> bool {
        self.git.branches.current == "master"
    }
}
