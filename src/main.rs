//! # enginey-tools: The Main Entry Point
//!
//! Parses the command line, initializes logging and dispatches to one of the build scripts:
//! `gensln`, `build`, `deploy` or `run`. Whatever exit code the script settles on
//! (usually the first failing tool's) becomes this process's exit code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use simplelog::{Config, SimpleLogger};

mod args;
mod commands;
mod config;
mod invariants;
mod platform;
mod staging;
mod system;

use args::ArgumentMap;
use commands::Workspace;
use system::{CommandRunner, HostRunner};

/// Build orchestration for the EngineY project.
#[derive(Parser)]
#[command(name = "enginey-tools")]
#[command(about = "Generate, build, deploy and run EngineY", long_about = None)]
struct Cli {
    /// The script to execute.
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root. Defaults to the current directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate IDE solutions / makefiles with premake.
    Gensln,
    /// Build the solution and copy runtime dependencies next to the executable.
    ///
    /// Flags: `-c <config>` (default `debug`).
    Build {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },
    /// Copy the engine tree into the per-user app-data directory and build it there.
    ///
    /// Flags: `-c <config>` (default `debug`).
    Deploy {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },
    /// Launch a built executable (or the editor, on Windows).
    ///
    /// Flags: `-c <config>` (default `debug`), `-p <project>` (default the main executable).
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // Logging failure shouldn't stop a build.
    let _ = SimpleLogger::init(log_level, Config::default());

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return;
    };

    std::process::exit(exit_code(dispatch(cli.root, command)));
}

/// The process exit code for a script's outcome: its own code on success,
/// `1` for any error the tool itself ran into.
fn exit_code(outcome: Result<i32>) -> i32 {
    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

fn dispatch(root: Option<PathBuf>, command: Commands) -> Result<i32> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let ws = Workspace::discover(root)?;
    run_command(&ws, command, &HostRunner)
}

fn run_command(ws: &Workspace, command: Commands, runner: &impl CommandRunner) -> Result<i32> {
    match command {
        Commands::Gensln => commands::gensln::run(ws, runner),
        Commands::Build { flags } => commands::build::run(ws, &ArgumentMap::parse(&flags), runner),
        Commands::Deploy { flags } => commands::deploy::run(ws, &ArgumentMap::parse(&flags), runner),
        Commands::Run { flags } => commands::run::run(ws, &ArgumentMap::parse(&flags), runner),
    }
}
