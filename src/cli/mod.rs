//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod watch;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::build::{BuildContext, Stage};
use crate::config::loader::{find_config, load_config, merge_cli_overrides, project_root, CliOverrides};
use crate::config::ConfigError;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Assetpipe - build front-end assets and serve them with live reload
#[derive(Parser, Debug)]
#[command(name = "assetpipe")]
#[command(about = "Assetpipe - build front-end assets and serve them with live reload")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Task to run (defaults to `build`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options accepted by every command.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Path to assetpipe.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Source root override
    #[arg(long, global = true)]
    pub src: Option<PathBuf>,

    /// Output root override
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Compile the SCSS entry into CSS inside the source tree
    Style,

    /// Serve the source tree with live reload, recompiling styles on change
    Watch {
        /// Port for the dev server
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        port: Option<u16>,

        /// Address for the dev server
        #[arg(long)]
        host: Option<String>,
    },

    /// Minify the JS entry into main.js
    Js,

    /// Minify and concatenate stylesheets into main.css
    Css,

    /// Copy HTML pages to the output root
    Html,

    /// Copy fonts
    Fonts,

    /// Optimize images
    Img,

    /// Delete the output root
    #[command(name = "clean-build", alias = "cleanBuild")]
    CleanBuild,

    /// Run cleanBuild, img, html, fonts, css and js in order
    Build {
        /// List the stages without running them
        #[arg(long)]
        dry_run: bool,
    },
}

impl Commands {
    /// The single stage this command runs, if it is a stage command.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Commands::Style => Some(Stage::Style),
            Commands::Js => Some(Stage::Js),
            Commands::Css => Some(Stage::Css),
            Commands::Html => Some(Stage::Html),
            Commands::Fonts => Some(Stage::Fonts),
            Commands::Img => Some(Stage::Img),
            Commands::CleanBuild => Some(Stage::CleanBuild),
            Commands::Watch { .. } | Commands::Build { .. } => None,
        }
    }
}

/// Load configuration, apply overrides and build the context.
fn load_context(
    global: &GlobalArgs,
    host: Option<String>,
    port: Option<u16>,
) -> Result<BuildContext, ConfigError> {
    let config_path = global.config.clone().or_else(find_config);
    if global.verbose {
        match &config_path {
            Some(path) => println!("Using config: {}", path.display()),
            None => println!("No assetpipe.toml found, using defaults"),
        }
    }

    let mut config = load_config(config_path.as_deref())?;
    let overrides = CliOverrides { src: global.src.clone(), out: global.out.clone(), host, port };
    merge_cli_overrides(&mut config, &overrides);

    let root = config_path
        .as_deref()
        .and_then(project_root)
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    Ok(BuildContext::new(config, root).with_verbose(global.verbose))
}

pub fn run() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_INVALID_ARGS)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };

    crate::logging::init(crate::logging::level_from_flags(
        cli.global.log_level.as_deref(),
        cli.global.verbose,
    ));

    let command = cli.command.unwrap_or(Commands::Build { dry_run: false });
    let (host, port) = match &command {
        Commands::Watch { host, port } => (host.clone(), *port),
        _ => (None, None),
    };

    let context = match load_context(&cli.global, host, port) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match command {
        Commands::Build { dry_run } => build::run_build(context, dry_run),
        Commands::Watch { .. } => watch::run_watch(context),
        other => match other.stage() {
            Some(stage) => build::run_stage(context, stage),
            None => ExitCode::from(EXIT_INVALID_ARGS),
        },
    }
}
