//! Application configuration for `GrayLineApp`.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigFile;
use crate::geo::GeoPosition;
use crate::illumination::GrayLineSettings;
use crate::maps::{map_catalog, MapStyle, DEFAULT_MAP_SIZE};
use crate::projection::{BufferSize, ProjectionMode};
use crate::resource_cache::{CacheEntry, ResourceCacheConfig};

/// Sub-directory of the cache root holding the background maps.
pub const MAPS_SUB_DIRECTORY: &str = "maps";

/// How often the cache is asked to check for stale maps.
pub const DEFAULT_FETCH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// How often the gray line is recomputed for the moving sun.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Everything needed to start the application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Station the views are centred on, in degrees.
    pub station: GeoPosition,
    pub mode: ProjectionMode,
    /// Target view size; empty renders at map resolution.
    pub viewport: BufferSize,
    pub map_size: BufferSize,
    pub map_style: MapStyle,
    /// Cache root; maps go to its [`MAPS_SUB_DIRECTORY`].
    pub cache_directory: PathBuf,
    pub root_uri: String,
    pub cache_ttl: Duration,
    pub grayline: GrayLineSettings,
    pub fetch_interval: Duration,
    pub refresh_interval: Duration,
}

impl AppConfig {
    /// Create a config with defaults for everything but the cache location.
    pub fn new(cache_directory: PathBuf, root_uri: impl Into<String>) -> Self {
        Self {
            station: GeoPosition::degrees(0.0, 0.0),
            mode: ProjectionMode::default(),
            viewport: BufferSize::new(0, 0),
            map_size: DEFAULT_MAP_SIZE,
            map_style: MapStyle::default(),
            cache_directory,
            root_uri: root_uri.into(),
            cache_ttl: ConfigFile::default().cache.ttl(),
            grayline: GrayLineSettings::default(),
            fetch_interval: DEFAULT_FETCH_INTERVAL,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Build the application config from the user's config file.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        Self {
            station: file.station_position(),
            mode: file.map.mode,
            map_size: file.map.size,
            map_style: file.map.style,
            cache_ttl: file.cache.ttl(),
            grayline: file.gray_line_settings(),
            ..Self::new(file.cache.directory.clone(), file.cache.root_uri.clone())
        }
    }

    /// Set the station.
    pub fn with_station(mut self, station: GeoPosition) -> Self {
        self.station = station;
        self
    }

    /// Set the projection mode.
    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the viewport.
    pub fn with_viewport(mut self, viewport: BufferSize) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the map size.
    pub fn with_map_size(mut self, size: BufferSize) -> Self {
        self.map_size = size;
        self
    }

    /// Set the gray-line refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Cache configuration for the map files.
    pub fn cache_config(&self) -> ResourceCacheConfig {
        ResourceCacheConfig::new(self.root_uri.clone(), self.cache_directory.clone())
            .with_sub_directory(MAPS_SUB_DIRECTORY)
            .with_ttl(self.cache_ttl)
    }

    /// The day/night cache entries for the configured maps.
    pub fn catalog(&self) -> [CacheEntry; 2] {
        map_catalog(self.map_size, self.map_style)
    }
}
