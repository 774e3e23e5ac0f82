mod check;
mod generate;
mod init;
mod sources;

pub use check::CheckCommand;
pub use generate::GenerateCommand;
pub use init::InitCommand;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use tsinterop_core::{InteropConfig, ParseError};

/// tsinterop - C# bindings for TypeScript declaration modules
#[derive(Parser)]
#[command(name = "tsinterop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Generate C# bindings.
    Generate(GenerateCommand),

    /// Parse declarations and validate the configuration without writing files.
    Check(CheckCommand),

    /// Create a configuration file.
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub fn execute(self) -> Result<()> {
        let log_level = if self.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()))
            .with_writer(std::io::stderr)
            .init();

        match self.command {
            Commands::Generate(cmd) => cmd.execute(),
            Commands::Check(cmd) => cmd.execute(),
            Commands::Init(cmd) => cmd.execute(),
        }
    }
}

/// Load the configuration and return it with the directory inputs resolve against.
fn load_config(path: &str) -> Result<(InteropConfig, PathBuf)> {
    let config_path = Path::new(path);
    if !config_path.exists() {
        anyhow::bail!(
            "Configuration file not found: {}\nRun `tsinterop init` to create one.",
            path
        );
    }

    let config = InteropConfig::from_file(config_path)
        .with_context(|| format!("Failed to load {}", path))?;
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Ok((config, base_dir))
}

fn print_parse_errors(errors: &[ParseError]) {
    for error in errors {
        let marker = if error.is_fatal() {
            style("✗").red()
        } else {
            style("!").yellow()
        };
        eprintln!("  {} {}", marker, error);
    }
}
