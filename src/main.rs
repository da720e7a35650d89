//! Binary entry point for brain.
//!
//! This binary provides the CLI, hook and MCP surfaces over the shared
//! resolution library.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use brain::cli::{
    HookEvent, Outcome, UNRESOLVED_HINT, cmd_hook, cmd_match, cmd_memories_clear,
    cmd_memories_path, cmd_projects, cmd_resolve, read_hook_input,
};
use brain::mcp::McpServer;
use brain::observability;
use brain::services::ResolutionService;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Brain - maps working directories to projects for AI coding agents.
#[derive(Parser)]
#[command(name = "brain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve the project for a directory.
    Resolve {
        /// Explicit project name; wins over everything else.
        #[arg(short, long)]
        project: Option<String>,

        /// Directory to resolve (default: current directory).
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Print JSON (`null` when unresolved).
        #[arg(long)]
        json: bool,
    },

    /// Match a directory against configured code paths only.
    Match {
        /// Directory to match (default: current directory).
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Print JSON (`null` when unresolved).
        #[arg(long)]
        json: bool,
    },

    /// List configured projects.
    Projects {
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Project memory directories.
    Memories {
        /// Memories subcommand.
        #[command(subcommand)]
        action: MemoriesAction,
    },

    /// Run a hook handler (reads JSON from stdin).
    Hook {
        /// Hook event to handle.
        #[command(subcommand)]
        event: HookEvent,
    },

    /// Run as MCP server over stdio.
    Serve,

    /// Configuration file.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Memories subcommands.
#[derive(Subcommand)]
enum MemoriesAction {
    /// Show where a project's memories live.
    Path {
        /// Explicit project name.
        #[arg(short, long)]
        project: Option<String>,

        /// Directory to resolve (default: current directory).
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Print JSON (`null` when unresolved).
        #[arg(long)]
        json: bool,
    },

    /// Delete a project's memory directory.
    Clear {
        /// Project whose memories are deleted.
        #[arg(short, long)]
        project: String,

        /// Confirm deletion.
        #[arg(long)]
        yes: bool,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration file path.
    Path,
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = observability::init_from_env(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Unresolved) => {
            eprintln!("{UNRESOLVED_HINT}");
            ExitCode::FAILURE
        },
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli) -> Result<Outcome, Box<dyn std::error::Error>> {
    let service = Arc::new(ResolutionService::from_env(cli.config.as_deref()));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let outcome = match cli.command {
        Commands::Resolve { project, cwd, json } => {
            cmd_resolve(&service, project.as_deref(), cwd.as_deref(), json, &mut out)?
        },

        Commands::Match { cwd, json } => cmd_match(&service, cwd.as_deref(), json, &mut out)?,

        Commands::Projects { json } => {
            cmd_projects(&service, json, &mut out)?;
            Outcome::Done
        },

        Commands::Memories { action } => match action {
            MemoriesAction::Path { project, cwd, json } => {
                cmd_memories_path(&service, project.as_deref(), cwd.as_deref(), json, &mut out)?
            },
            MemoriesAction::Clear { project, yes } => {
                cmd_memories_clear(&service, &project, yes, &mut out)?;
                Outcome::Done
            },
        },

        Commands::Hook { event } => {
            let input = read_hook_input(std::io::stdin().lock())?;
            cmd_hook(service, event, &input, &mut out)?;
            Outcome::Done
        },

        Commands::Serve => {
            drop(out);
            McpServer::new(service).run_stdio()?;
            Outcome::Done
        },

        Commands::Config { action } => match action {
            ConfigAction::Path => {
                writeln!(out, "{}", service.config_path().display())?;
                Outcome::Done
            },
        },
    };

    Ok(outcome)
}
