//! Status command - list stored cache generations.

use console::style;
use shellcache::cache::GenerationState;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the status command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    let worker = runner.worker()?;
    let manager = worker.manager();
    let statuses = runner.block_on(manager.status())?;

    println!("Config file:     {}", runner.config_path().display());
    println!("Cache directory: {}", runner.config().cache.directory.display());
    println!("Current version: {}", manager.version());
    println!();

    if statuses.is_empty() {
        println!("No cache generations stored. Run 'shellcache install'.");
        return Ok(());
    }

    let version = manager.version();
    let mut current_active = false;
    for status in statuses {
        let marker = if status.current {
            style("*").green()
        } else {
            style(" ").dim()
        };
        let state = match status.state {
            GenerationState::Stale => style(status.state.to_string()).yellow(),
            GenerationState::Active => style(status.state.to_string()).green(),
            _ => style(status.state.to_string()).cyan(),
        };
        let origin = if version.same_site(&status.name) {
            style(String::new())
        } else {
            style(" (other site)".to_string()).dim()
        };
        if status.current && status.state == GenerationState::Active {
            current_active = true;
        }
        println!(
            "{} {:<32} {:<14} {}{}",
            marker, status.name, state, status.stats, origin
        );
    }

    if current_active {
        println!();
        println!(
            "To ship new site assets, set [cache] version = {} and run 'shellcache install'.",
            version.next().number()
        );
    }
    Ok(())
}
