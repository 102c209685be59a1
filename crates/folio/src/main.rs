//! Folio CLI - incremental build pipeline for documentation sites.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_tasks::Task;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::build::Settings;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Incremental build pipeline for documentation sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to folio.toml config file
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Rebuild every target regardless of timestamps
    #[arg(short, long)]
    force: bool,

    /// Worker threads (defaults to config or 1)
    #[arg(short, long)]
    jobs: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold folio.toml and sample fragments
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Run every generator
    Build {
        /// Print a JSON summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Compile TOC fragments
    Toc,

    /// Render table fragments
    Tables,

    /// Render API parameter tables
    Api,

    /// Render step procedures
    Steps,

    /// Render program option snippets
    Options,

    /// Render image pages and PNGs
    Images,

    /// Render release installation snippets
    Releases,

    /// Regenerate the .htaccess redirect file
    Htaccess {
        /// Output file (defaults to paths.htaccess)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Regenerate robots.txt on any branch
    Robots {
        /// Output file (defaults to robots.txt in the public site)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the commit substitution and release.txt
    Hash,

    /// Write the include file overview page
    Includes,

    /// Rebuild whenever sources change
    Watch,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let settings = Settings {
        config: cli.config,
        force: cli.force,
        jobs: cli.jobs,
    };

    // Execute command
    match cli.command {
        Commands::Init { yes } => commands::init::run(&settings.config, yes)?,
        Commands::Build { json } => commands::build::run_all(&settings, json)?,
        Commands::Toc => commands::build::run_task(&settings, Task::Toc)?,
        Commands::Tables => commands::build::run_task(&settings, Task::Tables)?,
        Commands::Api => commands::build::run_task(&settings, Task::Api)?,
        Commands::Steps => commands::build::run_task(&settings, Task::Steps)?,
        Commands::Options => commands::build::run_task(&settings, Task::Options)?,
        Commands::Images => commands::build::run_task(&settings, Task::Images)?,
        Commands::Releases => commands::build::run_task(&settings, Task::Releases)?,
        Commands::Htaccess { output } => commands::site::htaccess(&settings, output)?,
        Commands::Robots { output } => commands::site::robots(&settings, output)?,
        Commands::Hash => commands::site::hash(&settings)?,
        Commands::Includes => commands::site::includes(&settings)?,
        Commands::Watch => commands::watch::run(&settings)?,
    }

    Ok(())
}
