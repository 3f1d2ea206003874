//! Day/night background map catalog.
//!
//! Background maps are Mercator BMPs named
//! `map-{D|N}-{width}x{height}-{Style}.bmp`. The catalog turns a size and
//! style into the two cache entries the application registers, and loads
//! the downloaded pair back as pixel buffers.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::buffers::ImageBuffer;
use crate::projection::BufferSize;
use crate::resource_cache::{CacheEntry, CacheKey};

/// Cache key of the day map.
pub const MAP_DAY_KEY: CacheKey = 1;

/// Cache key of the night map.
pub const MAP_NIGHT_KEY: CacheKey = 2;

/// Default map size.
pub const DEFAULT_MAP_SIZE: BufferSize = BufferSize::new(660, 330);

/// Errors loading or naming background maps.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("not a map file name: {0}")]
    InvalidFileName(String),

    #[error("unknown map style '{0}' (expected terrain or countries)")]
    UnknownStyle(String),

    #[error("failed to read map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("map {path} is {actual}, expected {expected}")]
    UnexpectedSize {
        path: PathBuf,
        expected: BufferSize,
        actual: BufferSize,
    },
}

/// Day or night variant of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapVariant {
    Day,
    Night,
}

impl MapVariant {
    fn code(&self) -> &'static str {
        match self {
            MapVariant::Day => "D",
            MapVariant::Night => "N",
        }
    }

    /// Cache key the variant is registered under.
    pub fn cache_key(&self) -> CacheKey {
        match self {
            MapVariant::Day => MAP_DAY_KEY,
            MapVariant::Night => MAP_NIGHT_KEY,
        }
    }
}

/// Artwork style of a map pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapStyle {
    /// Shaded relief.
    #[default]
    Terrain,
    /// Political boundaries.
    Countries,
}

impl MapStyle {
    /// Name as used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::Terrain => "Terrain",
            MapStyle::Countries => "Countries",
        }
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MapStyle {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terrain" => Ok(MapStyle::Terrain),
            "countries" => Ok(MapStyle::Countries),
            _ => Err(MapError::UnknownStyle(s.to_string())),
        }
    }
}

/// One background map file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapFile {
    pub variant: MapVariant,
    pub size: BufferSize,
    pub style: MapStyle,
}

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^map-([DN])-(\d+)x(\d+)-(Terrain|Countries)\.bmp$")
            .expect("map file name pattern is valid")
    })
}

impl MapFile {
    pub fn new(variant: MapVariant, size: BufferSize, style: MapStyle) -> Self {
        Self {
            variant,
            size,
            style,
        }
    }

    /// File name, e.g. `map-D-660x330-Terrain.bmp`.
    pub fn file_name(&self) -> String {
        format!(
            "map-{}-{}x{}-{}.bmp",
            self.variant.code(),
            self.size.width,
            self.size.height,
            self.style
        )
    }

    /// Parse a file name produced by [`Self::file_name`].
    pub fn parse(name: &str) -> Result<Self, MapError> {
        let invalid = || MapError::InvalidFileName(name.to_string());
        let caps = file_name_pattern().captures(name).ok_or_else(invalid)?;

        let variant = match &caps[1] {
            "D" => MapVariant::Day,
            _ => MapVariant::Night,
        };
        let width = caps[2].parse().map_err(|_| invalid())?;
        let height = caps[3].parse().map_err(|_| invalid())?;
        let style = caps[4].parse()?;

        Ok(Self::new(variant, BufferSize::new(width, height), style))
    }

    /// Cache entry for this file.
    pub fn cache_entry(&self) -> CacheEntry {
        CacheEntry::new(self.variant.cache_key(), self.file_name())
    }
}

/// The day and night cache entries for a map size and style.
pub fn map_catalog(size: BufferSize, style: MapStyle) -> [CacheEntry; 2] {
    [
        MapFile::new(MapVariant::Day, size, style).cache_entry(),
        MapFile::new(MapVariant::Night, size, style).cache_entry(),
    ]
}

fn load_map(path: &Path, expected: BufferSize) -> Result<ImageBuffer, MapError> {
    let image = image::open(path)
        .map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let actual = BufferSize::new(image.width(), image.height());
    if actual != expected {
        return Err(MapError::UnexpectedSize {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }
    Ok(image)
}

/// Load the cached day and night maps from `directory`.
pub fn load_source_maps(
    directory: &Path,
    size: BufferSize,
    style: MapStyle,
) -> Result<(ImageBuffer, ImageBuffer), MapError> {
    let day_path = directory.join(MapFile::new(MapVariant::Day, size, style).file_name());
    let night_path = directory.join(MapFile::new(MapVariant::Night, size, style).file_name());

    let day = load_map(&day_path, size)?;
    let night = load_map(&night_path, size)?;
    debug!(size = %size, style = %style, "Loaded source maps");
    Ok((day, night))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    fn write_bmp(dir: &Path, file: MapFile, rgba: [u8; 4]) {
        let img = ImageBuffer::from_pixel(file.size.width, file.size.height, Rgba(rgba));
        img.save(dir.join(file.file_name())).unwrap();
    }

    #[test]
    fn test_file_name() {
        let f = MapFile::new(MapVariant::Day, DEFAULT_MAP_SIZE, MapStyle::Terrain);
        assert_eq!(f.file_name(), "map-D-660x330-Terrain.bmp");
        let n = MapFile::new(MapVariant::Night, BufferSize::new(1320, 660), MapStyle::Countries);
        assert_eq!(n.file_name(), "map-N-1320x660-Countries.bmp");
    }

    #[test]
    fn test_parse_round_trips_file_name() {
        let f = MapFile::parse("map-N-1320x660-Countries.bmp").unwrap();
        assert_eq!(f.variant, MapVariant::Night);
        assert_eq!(f.size, BufferSize::new(1320, 660));
        assert_eq!(f.style, MapStyle::Countries);
    }

    #[test]
    fn test_parse_rejects_other_names() {
        for name in [
            "map-X-660x330-Terrain.bmp",
            "map-D-660x330-Terrain.png",
            "readme.txt",
            "map-D-66x-Terrain.bmp",
        ] {
            assert!(
                matches!(MapFile::parse(name), Err(MapError::InvalidFileName(_))),
                "{} should not parse",
                name
            );
        }
    }

    #[test]
    fn test_catalog_keys() {
        let [day, night] = map_catalog(DEFAULT_MAP_SIZE, MapStyle::Terrain);
        assert_eq!(day.key, MAP_DAY_KEY);
        assert_eq!(night.key, MAP_NIGHT_KEY);
        assert_eq!(night.local_file_name, "map-N-660x330-Terrain.bmp");
    }

    #[test]
    fn test_style_parse() {
        assert_eq!("countries".parse::<MapStyle>().unwrap(), MapStyle::Countries);
        assert!("satellite".parse::<MapStyle>().is_err());
    }

    #[test]
    fn test_load_source_maps() {
        let dir = TempDir::new().unwrap();
        let size = BufferSize::new(16, 8);
        let day = MapFile::new(MapVariant::Day, size, MapStyle::Terrain);
        let night = MapFile::new(MapVariant::Night, size, MapStyle::Terrain);
        write_bmp(dir.path(), day, [200, 100, 50, 255]);
        write_bmp(dir.path(), night, [5, 5, 30, 255]);

        let (day, night) = load_source_maps(dir.path(), size, MapStyle::Terrain).unwrap();
        assert_eq!(day.get_pixel(3, 3).0, [200, 100, 50, 255]);
        assert_eq!(night.get_pixel(15, 7).0, [5, 5, 30, 255]);
    }

    #[test]
    fn test_load_missing_map_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_source_maps(dir.path(), DEFAULT_MAP_SIZE, MapStyle::Terrain).unwrap_err();
        assert!(matches!(err, MapError::Read { .. }));
    }

    #[test]
    fn test_load_wrong_size_fails() {
        let dir = TempDir::new().unwrap();
        let size = BufferSize::new(16, 8);
        // Day file with the right name but wrong dimensions
        let img = ImageBuffer::from_pixel(8, 4, Rgba([0, 0, 0, 255]));
        let day = MapFile::new(MapVariant::Day, size, MapStyle::Terrain);
        img.save(dir.path().join(day.file_name())).unwrap();

        let err = load_source_maps(dir.path(), size, MapStyle::Terrain).unwrap_err();
        assert!(matches!(err, MapError::UnexpectedSize { .. }));
    }
}
