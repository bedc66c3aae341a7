//! Fetch command - route one request through the cache.

use std::path::PathBuf;

use shellcache::router::RequestClass;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the fetch command, optionally writing the body to `output`.
pub fn run(runner: &CliRunner, url: &str, output: Option<PathBuf>) -> Result<(), CliError> {
    runner.log_startup("fetch");
    let worker = runner.worker()?;

    let class = match RequestClass::classify(url, worker.router().template()) {
        RequestClass::Tile { coord, .. } => format!("tile {}", coord),
        RequestClass::Static { .. } => "static".to_string(),
    };
    let outcome = runner.block_on(worker.fetch(url))?;
    let response = &outcome.response;

    println!("{} ({})", url, class);
    println!("  Source:       {}", outcome.source);
    println!("  Status:       {}", response.status);
    println!(
        "  Content-Type: {}",
        response.content_type.as_deref().unwrap_or("(none)")
    );
    println!("  Size:         {} bytes", response.len());

    if let Some(path) = output {
        std::fs::write(&path, &response.body).map_err(|e| CliError::FileWrite {
            path: path.display().to_string(),
            error: e,
        })?;
        println!("  Saved to:     {}", path.display());
    }
    Ok(())
}
