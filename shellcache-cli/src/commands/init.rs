//! Init command - initialize configuration file.

use std::path::Path;

use shellcache::config::ConfigFile;

use crate::error::CliError;

/// Run the init command.
pub fn run(config_path: &Path) -> Result<(), CliError> {
    if ConfigFile::ensure_exists_at(config_path)? {
        println!("Created configuration file: {}", config_path.display());
    } else {
        println!("Configuration file already exists: {}", config_path.display());
    }
    println!();
    println!("Edit this file to set the site label, cache version, map region and asset list.");
    println!("Bump [cache] version on every deploy, then run 'shellcache install'.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_default_config_once() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        run(&config_path).unwrap();
        let written = std::fs::read_to_string(&config_path).unwrap();
        assert!(written.contains("[region]"));

        std::fs::write(&config_path, "[cache]\nversion = 5\n").unwrap();
        run(&config_path).unwrap();
        let kept = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(kept.cache.version, 5);
    }
}
