//! Install command - populate the current cache generation.

use console::style;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the install command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("install");
    let worker = runner.worker()?;
    let manifest = worker.manifest();

    println!(
        "Installing {} ({} static assets, {} tile endpoints)...",
        worker.manager().version(),
        manifest.static_count(),
        manifest.tile_count()
    );

    let report = runner.block_on(worker.install())?;

    println!(
        "{} Installed {} in {:.1}s",
        style("✓").green(),
        report.version,
        report.duration.as_secs_f64()
    );
    println!(
        "  Installed at:  {}",
        report.installed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Static assets: {}", report.static_cached);
    println!("  Tiles cached:  {}", report.tiles_cached);
    if report.tiles_failed > 0 {
        println!(
            "  Tiles failed:  {} {}",
            report.tiles_failed,
            style("(served as transparent placeholders when offline)").dim()
        );
    }
    println!();
    println!("Run 'shellcache activate' to remove older generations.");
    Ok(())
}
