//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! Produces the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let zoom_levels = config
        .region
        .zoom_levels
        .iter()
        .map(|z| z.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let base_url = config.assets.base_url.as_deref().unwrap_or("");

    format!(
        r#"[cache]
; Site label; generations are named <site>-cache-v<version>
site = {}
; Bump on every deploy. Activation deletes every other generation.
version = {}
; Directory holding one subdirectory per cache generation
directory = {}

[region]
; Bounding box whose map tiles are precached, in degrees
lat_min = {}
lat_max = {}
lon_min = {}
lon_max = {}
; Comma-separated zoom levels (0-22)
zoom_levels = {}

[tiles]
; Tile URL template with {{s}}, {{z}}, {{x}} and {{y}} placeholders
template = {}
; Load-balancing subdomains; every tile is precached from each of them
subdomains = {}
; Per-tile fetch timeout in seconds during install (0 = no timeout)
timeout = {}

[assets]
; Origin used to resolve relative asset paths (empty = paths are absolute URLs)
base_url = {}
; Site shell, in precache order. Any failure here aborts install.
paths = {}

[logging]
; Log file location
file = {}
"#,
        config.cache.site,
        config.cache.version,
        path_to_string(&config.cache.directory),
        config.region.lat_min,
        config.region.lat_max,
        config.region.lon_min,
        config.region.lon_max,
        zoom_levels,
        config.tiles.template,
        config.tiles.subdomains.join(", "),
        config.tiles.timeout,
        base_url,
        config.assets.paths.join(", "),
        path_to_string(&config.logging.file),
    )
}

/// Convert a path to a string, using ~ for home directory.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use super::to_config_string;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.cache.site = "beach-house".to_string();
        config.cache.version = 9;
        config.cache.directory = temp_dir.path().join("generations");
        config.region.zoom_levels = vec![11, 12];
        config.tiles.subdomains = vec!["a".to_string(), "b".to_string()];
        config.assets.base_url = Some("https://beach-house.example".to_string());

        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_default_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let config = ConfigFile::default();
        config.save_to(&config_path).unwrap();

        assert_eq!(ConfigFile::load_from(&config_path).unwrap(), config);
    }

    #[test]
    fn test_output_is_commented() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("[cache]"));
        assert!(content.contains("; Bump on every deploy"));
        assert!(content.contains("template = https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"));
        assert!(content.contains("subdomains = a, b, c"));
        assert!(content.contains("base_url = https://guestbook.example"));
    }
}
