//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the
/// INI, then checks that the result describes a usable cache.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section, "site") {
            config.cache.site = v.to_string();
        }
        if let Some(v) = parse_value(section, "cache", "version", "must be a non-negative integer")? {
            config.cache.version = v;
        }
        if let Some(v) = non_empty(section, "directory") {
            config.cache.directory = expand_tilde(v);
        }
    }

    // [region] section
    if let Some(section) = ini.section(Some("region")) {
        let reason = "must be a number in degrees";
        if let Some(v) = parse_value(section, "region", "lat_min", reason)? {
            config.region.lat_min = v;
        }
        if let Some(v) = parse_value(section, "region", "lat_max", reason)? {
            config.region.lat_max = v;
        }
        if let Some(v) = parse_value(section, "region", "lon_min", reason)? {
            config.region.lon_min = v;
        }
        if let Some(v) = parse_value(section, "region", "lon_max", reason)? {
            config.region.lon_max = v;
        }
        if let Some(v) = section.get("zoom_levels") {
            let zooms = split_list(v)
                .iter()
                .map(|z| z.parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid("region", "zoom_levels", v, "must be a comma-separated list of integers"))?;
            if zooms.is_empty() {
                return Err(invalid("region", "zoom_levels", v, "at least one zoom level is required"));
            }
            config.region.zoom_levels = zooms;
        }
    }

    // [tiles] section
    if let Some(section) = ini.section(Some("tiles")) {
        if let Some(v) = non_empty(section, "template") {
            config.tiles.template = v.to_string();
        }
        if let Some(v) = section.get("subdomains") {
            let subdomains = split_list(v);
            if subdomains.is_empty() {
                return Err(invalid("tiles", "subdomains", v, "at least one subdomain is required"));
            }
            config.tiles.subdomains = subdomains;
        }
        if let Some(v) = parse_value(section, "tiles", "timeout", "must be a non-negative integer (seconds)")? {
            config.tiles.timeout = v;
        }
    }

    // [assets] section
    if let Some(section) = ini.section(Some("assets")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            config.assets.base_url = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = section.get("paths") {
            config.assets.paths = split_list(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    config.cache_version()?;
    config.region()?;
    config.tile_template()?;
    config.check_assets()?;

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(
    section: &Properties,
    section_name: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError> {
    match section.get(key) {
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(section_name, key, v, reason)),
        None => Ok(None),
    }
}

/// Splits a comma-separated list, dropping empty items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
