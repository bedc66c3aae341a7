//! Manifest command - print the precache manifest.

use std::path::Path;

use shellcache::config::ConfigFile;

use crate::error::CliError;

/// Run the manifest command.
///
/// With `json`, prints every entry as JSON. Otherwise prints a summary with
/// the tile rectangle of each zoom level.
pub fn run(config_path: &Path, json: bool) -> Result<(), CliError> {
    let config = ConfigFile::load_from(config_path)?;
    let manifest = config.manifest()?;

    if json {
        let output = serde_json::to_string_pretty(&manifest)
            .map_err(|e| CliError::Output(e.to_string()))?;
        println!("{}", output);
        return Ok(());
    }

    let region = config.region()?;
    println!("Cache version: {}", config.cache_version()?);
    println!("Static assets: {}", manifest.static_count());
    for url in manifest.static_assets() {
        println!("  {}", url);
    }
    println!();
    println!(
        "Region: lat {} to {}, lon {} to {}",
        region.lat_min, region.lat_max, region.lon_min, region.lon_max
    );
    for range in region.tile_ranges() {
        println!(
            "  zoom {:>2}: x {}..={}, y {}..={} ({} tiles)",
            range.zoom,
            range.min_x,
            range.max_x,
            range.min_y,
            range.max_y,
            range.len()
        );
    }
    println!(
        "Tile endpoints: {} ({} tiles x {} subdomains)",
        manifest.tile_count(),
        region.tile_count(),
        config.tiles.subdomains.len()
    );
    println!("Total entries: {}", manifest.len());
    Ok(())
}
