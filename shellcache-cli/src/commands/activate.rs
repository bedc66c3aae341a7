//! Activate command - delete stale cache generations.

use console::style;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the activate command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("activate");
    let worker = runner.worker()?;

    let report = runner.block_on(worker.activate())?;

    println!("{} Active generation: {}", style("✓").green(), report.kept);
    if report.deleted.is_empty() {
        println!("  No stale generations");
    } else {
        for name in &report.deleted {
            println!("  Deleted {}", name);
        }
    }
    Ok(())
}
