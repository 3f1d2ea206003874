//! Pixel ↔ geocoordinate mapping.
//!
//! Two families of views are supported:
//!
//! - **Mercator**: an equirectangular world map where longitude and latitude
//!   map linearly onto x and y. The station variant rolls the map so the
//!   station longitude sits in the centre column.
//! - **Azimuthal**: two disks side by side on a canvas twice as wide as it is
//!   tall. The left disk is the hemisphere centred on the station, the right
//!   disk the hemisphere centred on its antipode, drawn mirrored.
//!
//! All angles passed into and returned from this module are radians.

mod azimuthal;
mod mercator;
mod view;

pub use azimuthal::{geo_to_azimuthal_pixel, pixel_to_azimuthal_geo, AzimuthalCenter};
pub use mercator::{geo_to_mercator_pixel, mercator_pixel_to_geo};
pub use view::ViewGeometry;

use std::fmt;
use std::str::FromStr;

/// How a map is rendered and where it is centred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectionMode {
    /// Plain Mercator map with the prime meridian in the centre.
    #[default]
    Mercator,
    /// Mercator map centred on the station longitude.
    StationMercator,
    /// Near/far azimuthal disks centred on the station.
    StationAzimuthal,
}

impl ProjectionMode {
    /// All modes, in display order.
    pub const ALL: [ProjectionMode; 3] = [
        ProjectionMode::Mercator,
        ProjectionMode::StationMercator,
        ProjectionMode::StationAzimuthal,
    ];

    /// Short name used in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionMode::Mercator => "mercator",
            ProjectionMode::StationMercator => "station-mercator",
            ProjectionMode::StationAzimuthal => "station-azimuthal",
        }
    }

    /// Returns true for the two-disk azimuthal view.
    pub fn is_azimuthal(&self) -> bool {
        matches!(self, ProjectionMode::StationAzimuthal)
    }
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown projection mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown projection mode '{0}' (expected mercator, station-mercator or station-azimuthal)")]
pub struct UnknownProjectionMode(pub String);

impl FromStr for ProjectionMode {
    type Err = UnknownProjectionMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mercator" => Ok(ProjectionMode::Mercator),
            "station-mercator" | "station_mercator" => Ok(ProjectionMode::StationMercator),
            "station-azimuthal" | "station_azimuthal" | "azimuthal" => {
                Ok(ProjectionMode::StationAzimuthal)
            }
            _ => Err(UnknownProjectionMode(s.to_string())),
        }
    }
}

/// Pixel dimensions of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSize {
    pub width: u32,
    pub height: u32,
}

impl BufferSize {
    /// Create a new buffer size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for BufferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Integer pixel position. May lie outside the buffer for unclamped inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPosition {
    pub x: i32,
    pub y: i32,
}

impl PixelPosition {
    /// Create a new pixel position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true if the position lies inside a buffer of the given size.
    pub fn is_inside(&self, size: BufferSize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < size.width && (self.y as u32) < size.height
    }
}
