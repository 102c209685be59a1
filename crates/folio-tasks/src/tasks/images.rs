//! Image pages and SVG to PNG conversion.
//!
//! `images/metadata.yaml` lists the images. Each gets an `.rst` page next to
//! its SVG source and one PNG per output, rendered by the configured
//! converter command.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, LazyLock};

use folio_jobs::{Job, JobResult};
use regex::Regex;
use serde::Deserialize;

use super::Outputs;
use crate::context::{write_output, BuildContext};
use crate::error::TaskError;

const METADATA: &str = "metadata.yaml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageMeta {
    pub name: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub output: Vec<ImageOutput>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ImageOutput {
    /// Suffix of the PNG name; untagged outputs are named after the image.
    #[serde(default)]
    pub tag: Option<String>,
    pub dpi: u32,
    pub width: u32,
}

impl ImageOutput {
    fn file_name(&self, image: &str) -> String {
        match &self.tag {
            Some(tag) => format!("{image}-{tag}.png"),
            None => format!("{image}.png"),
        }
    }
}

struct Conversion {
    command: String,
    target: PathBuf,
}

/// Page and conversion jobs for every image in the metadata file.
///
/// Yields nothing when the images directory has no metadata.
pub fn jobs(ctx: &Arc<BuildContext>) -> Result<impl Iterator<Item = Job<Outputs>>, TaskError> {
    let dir = ctx.config.images_dir();
    let meta_file = dir.join(METADATA);

    let images: Vec<ImageMeta> = if meta_file.exists() {
        folio_yaml::ingest_yaml_list(&meta_file)?
    } else {
        Vec::new()
    };

    let mut jobs = Vec::new();
    for image in images {
        let source = dir.join(format!("{}.svg", image.name));

        let page = dir.join(format!("{}.rst", image.name));
        jobs.push(
            Job::new(
                page.display().to_string(),
                generate_page,
                (Arc::clone(ctx), image.clone(), page.clone()),
            )
            .target(page)
            .dependency(meta_file.clone()),
        );

        for output in &image.output {
            let target = dir.join(output.file_name(&image.name));
            let command =
                converter_command(&ctx.config.images.converter, &source, &target, output);
            jobs.push(
                Job::new(
                    target.display().to_string(),
                    convert_image,
                    Conversion {
                        command,
                        target: target.clone(),
                    },
                )
                .target(target)
                .dependency(source.clone()),
            );
        }
    }

    Ok(jobs.into_iter())
}

/// Fill `{source}`, `{target}`, `{dpi}` and `{width}` in a converter
/// command. Unknown placeholders are left alone.
pub fn converter_command(
    template: &str,
    source: &Path,
    target: &Path,
    output: &ImageOutput,
) -> String {
    static PLACEHOLDER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

    let values: HashMap<&str, String> = HashMap::from([
        ("source", source.display().to_string()),
        ("target", target.display().to_string()),
        ("dpi", output.dpi.to_string()),
        ("width", output.width.to_string()),
    ]);

    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn generate_page(
    (ctx, image, page): (Arc<BuildContext>, ImageMeta, PathBuf),
) -> JobResult<Outputs> {
    let width = image
        .output
        .iter()
        .find(|o| o.tag.is_none())
        .map(|o| o.width);

    let rendered = ctx.templates.render(
        "image.rst",
        minijinja::context! {
            name => &image.name,
            alt => &image.alt,
            width => width,
        },
    )?;

    Ok(vec![write_output(&page, &rendered)?])
}

fn convert_image(conversion: Conversion) -> JobResult<Outputs> {
    let Conversion { command, target } = conversion;

    let status = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .status()
        .map_err(|e| TaskError::Command {
            command: command.clone(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(TaskError::Command {
            command,
            reason: status.to_string(),
        }
        .into());
    }

    tracing::info!("Generated image {}", target.display());
    Ok(vec![target])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::tests::{project, write};
    use crate::tasks::Task;
    use folio_jobs::Runner;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn fills_converter_placeholders() {
        let output = ImageOutput {
            tag: Some("print".to_string()),
            dpi: 300,
            width: 1200,
        };

        let command = converter_command(
            "convert -density {dpi} -resize {width} {source} {target} {unknown}",
            Path::new("img/a.svg"),
            Path::new("img/a-print.png"),
            &output,
        );

        assert_eq!(
            command,
            "convert -density 300 -resize 1200 img/a.svg img/a-print.png {unknown}"
        );
    }

    #[test]
    fn no_metadata_means_no_jobs() {
        let (_temp, ctx) = project();

        assert_eq!(jobs(&ctx).unwrap().count(), 0);
    }

    #[test]
    fn builds_page_and_png_per_output() {
        let (_temp, ctx) = project();
        let dir = ctx.config.images_dir();
        write(
            &dir.join(METADATA),
            "name: sharding\nalt: Sharded cluster\noutput:\n  - dpi: 96\n    width: 600\n  - tag: print\n    dpi: 300\n    width: 1800\n",
        );
        write(&dir.join("sharding.svg"), "<svg/>");

        let mut config = ctx.config.clone();
        config.images.converter = "cp {source} {target}".to_string();
        let ctx = crate::BuildContext::new(config);

        let names: Vec<String> = jobs(&ctx).unwrap().map(|j| j.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                dir.join("sharding.rst").display().to_string(),
                dir.join("sharding.png").display().to_string(),
                dir.join("sharding-print.png").display().to_string(),
            ]
        );

        let outputs = Task::Images.run(&ctx, &Runner::new()).unwrap();

        assert_eq!(outputs.len(), 3);
        assert_eq!(fs::read_to_string(dir.join("sharding-print.png")).unwrap(), "<svg/>");
        let page = fs::read_to_string(dir.join("sharding.rst")).unwrap();
        assert_eq!(
            page,
            ".. figure:: /images/sharding.png\n   :alt: Sharded cluster\n   :align: center\n   :figwidth: 600px\n"
        );
    }

    #[test]
    fn failing_converter_is_an_error() {
        let (_temp, ctx) = project();
        let dir = ctx.config.images_dir();
        write(
            &dir.join(METADATA),
            "name: broken\noutput:\n  - dpi: 96\n    width: 600\n",
        );
        write(&dir.join("broken.svg"), "<svg/>");

        let mut config = ctx.config.clone();
        config.images.converter = "exit 3".to_string();
        let ctx = crate::BuildContext::new(config);

        assert!(Task::Images.run(&ctx, &Runner::new()).is_err());
    }
}
