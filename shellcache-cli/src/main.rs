//! shellcache CLI - Command-line interface
//!
//! Drives the offline cache lifecycle (install, activate, fetch) against the
//! on-disk generation store configured in `~/.shellcache/config.ini`.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shellcache::config::config_file_path;

use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "shellcache")]
#[command(version, about = "Offline precache and map-tile cache engine", long_about = None)]
struct Cli {
    /// Config file (default: ~/.shellcache/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file if none exists
    Init,

    /// Print the precache manifest
    Manifest {
        /// Print every entry as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch and store the manifest into the current cache generation
    Install,

    /// Delete every generation except the current one
    Activate,

    /// Answer one request cache first
    Fetch {
        /// Request URL or site path
        url: String,

        /// Write the response body to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored generations
    Status,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().unwrap_or_else(config_file_path);

    match cli.command {
        Commands::Init => commands::init::run(&config_path),
        Commands::Manifest { json } => commands::manifest::run(&config_path, json),
        Commands::Install => commands::install::run(&CliRunner::new(cli.config, cli.verbose)?),
        Commands::Activate => commands::activate::run(&CliRunner::new(cli.config, cli.verbose)?),
        Commands::Fetch { url, output } => {
            commands::fetch::run(&CliRunner::new(cli.config, cli.verbose)?, &url, output)
        }
        Commands::Status => commands::status::run(&CliRunner::new(cli.config, cli.verbose)?),
    }
}
