//! Settings structs and their defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::geo::GeoPosition;
use crate::illumination::{GrayLineSettings, TwilightBand, DEFAULT_GRAYLINE_SHARPNESS};
use crate::maps::{MapStyle, DEFAULT_MAP_SIZE};
use crate::projection::{BufferSize, ProjectionMode};

/// Default remote directory holding the background maps.
pub const DEFAULT_MAP_ROOT_URI: &str = "https://clearskyinstitute.com/ham/HamClock/maps/";

/// Default cache TTL in hours.
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 6;

/// Largest accepted cache TTL in hours (one year).
pub const MAX_CACHE_TTL_HOURS: u64 = 24 * 365;

/// Name of the per-user directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".grayline";

/// Full user configuration, one struct per INI section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub station: StationSettings,
    pub map: MapSettings,
    pub cache: CacheSettings,
    pub grayline: GrayLineSection,
}

/// `[station]`: where the views are centred.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StationSettings {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

/// `[map]`: background artwork and view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    pub style: MapStyle,
    /// Size of the downloaded maps.
    pub size: BufferSize,
    pub mode: ProjectionMode,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            style: MapStyle::default(),
            size: DEFAULT_MAP_SIZE,
            mode: ProjectionMode::default(),
        }
    }
}

/// `[cache]`: where and how long maps are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub directory: PathBuf,
    pub root_uri: String,
    pub ttl_hours: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            root_uri: DEFAULT_MAP_ROOT_URI.to_string(),
            ttl_hours: DEFAULT_CACHE_TTL_HOURS,
        }
    }
}

impl CacheSettings {
    /// TTL as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours.saturating_mul(3600))
    }
}

/// `[grayline]`: shape of the twilight band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayLineSection {
    pub band: TwilightBand,
    pub sharpness: f64,
}

impl Default for GrayLineSection {
    fn default() -> Self {
        Self {
            band: TwilightBand::default(),
            sharpness: DEFAULT_GRAYLINE_SHARPNESS,
        }
    }
}

impl ConfigFile {
    /// Station position in degrees.
    pub fn station_position(&self) -> GeoPosition {
        GeoPosition::degrees(self.station.latitude, self.station.longitude)
    }

    /// Gray-line mask settings.
    pub fn gray_line_settings(&self) -> GrayLineSettings {
        GrayLineSettings::default()
            .with_band(self.grayline.band)
            .with_sharpness(self.grayline.sharpness)
    }
}

/// Per-user directory (`~/.grayline`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default cache directory (`~/.grayline/cache`).
pub fn default_cache_directory() -> PathBuf {
    config_directory().join("cache")
}

/// Default log directory (`~/.grayline/logs`).
pub fn default_log_directory() -> PathBuf {
    config_directory().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_converts_hours() {
        let cache = CacheSettings {
            ttl_hours: 2,
            ..CacheSettings::default()
        };
        assert_eq!(cache.ttl(), Duration::from_secs(7200));
    }

    #[test]
    fn test_ttl_saturates_instead_of_overflowing() {
        let cache = CacheSettings {
            ttl_hours: u64::MAX,
            ..CacheSettings::default()
        };
        assert_eq!(cache.ttl(), Duration::from_secs(u64::MAX));
    }
}
