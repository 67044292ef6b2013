//! agentctl CLI
//!
//! Syncs the `agents/` catalog into coding-agent conventions and
//! translates abstract invocations into target command lines.

mod cli;
mod commands;
mod error;
mod interactive;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Coding-agent catalog sync", "agentctl".green().bold());
            println!();
            println!("Run {} for available commands.", "agentctl --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    let cwd = std::env::current_dir()?;
    match cmd {
        Commands::SyncCommands(args) => {
            let interactive = commands::is_interactive(&args);
            commands::run_sync_commands(&cwd, &args, interactive)
        }
        Commands::Translate(args) => commands::run_translate(&cwd, &args),
        Commands::Targets { json } => commands::run_targets(&cwd, json),
    }
}
