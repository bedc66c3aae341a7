//! User configuration stored in `~/.shellcache/config.ini`.
//!
//! # Example
//!
//! ```no_run
//! use shellcache::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let manifest = config.manifest()?;
//! println!("{} resources to precache", manifest.len());
//! # Ok::<(), shellcache::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AssetSettings, CacheSettings, ConfigFile, LoggingSettings, RegionSettings, TileSettings,
};
