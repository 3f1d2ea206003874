//! User configuration.
//!
//! Settings live in an INI file at `~/.grayline/config.ini`. Every key is
//! optional; missing keys keep their defaults and invalid values are
//! reported with the section and key they came from.
//!
//! # Example
//!
//! ```
//! use grayline::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! assert_eq!(config.cache.ttl_hours, 6);
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_file_path, ConfigFileError};
pub use settings::{
    config_directory, default_cache_directory, default_log_directory, CacheSettings, ConfigFile,
    GrayLineSection, MapSettings, StationSettings, CONFIG_DIR_NAME, DEFAULT_CACHE_TTL_HOURS,
    DEFAULT_MAP_ROOT_URI, MAX_CACHE_TTL_HOURS,
};
