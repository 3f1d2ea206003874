//! Geographic position value type.

use std::f64::consts::{FRAC_PI_2, PI};

/// Maximum latitude in degrees.
pub const MAX_LAT_DEG: f64 = 90.0;

/// Maximum longitude in degrees.
pub const MAX_LON_DEG: f64 = 180.0;

/// Unit in which a [`GeoPosition`] stores its angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    /// Angles in degrees.
    Degrees,
    /// Angles in radians.
    Radians,
}

/// A latitude/longitude pair tagged with its angular unit.
///
/// Positions are immutable. Latitude is clamped to ±90° (±π/2) and longitude
/// to ±180° (±π) on construction, and the unit conversions always return a
/// new value rather than rewriting the receiver.
///
/// # Example
///
/// ```
/// use grayline::geo::GeoPosition;
///
/// let station = GeoPosition::degrees(45.0, -75.0);
/// let rad = station.to_radians();
/// assert!((rad.lat() - 45f64.to_radians()).abs() < 1e-12);
/// assert_eq!(station.lat(), 45.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    lat: f64,
    lon: f64,
    unit: AngleUnit,
}

impl GeoPosition {
    /// Create a position in the given unit, clamping out-of-range values.
    pub fn new(lat: f64, lon: f64, unit: AngleUnit) -> Self {
        let (max_lat, max_lon) = match unit {
            AngleUnit::Degrees => (MAX_LAT_DEG, MAX_LON_DEG),
            AngleUnit::Radians => (FRAC_PI_2, PI),
        };
        Self {
            lat: lat.clamp(-max_lat, max_lat),
            lon: lon.clamp(-max_lon, max_lon),
            unit,
        }
    }

    /// Create a position from degrees.
    pub fn degrees(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, AngleUnit::Degrees)
    }

    /// Create a position from radians.
    pub fn radians(lat: f64, lon: f64) -> Self {
        Self::new(lat, lon, AngleUnit::Radians)
    }

    /// Latitude in this position's unit.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in this position's unit.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// The unit the angles are stored in.
    #[inline]
    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// Returns this position expressed in radians.
    pub fn to_radians(&self) -> Self {
        match self.unit {
            AngleUnit::Radians => *self,
            AngleUnit::Degrees => Self::radians(self.lat.to_radians(), self.lon.to_radians()),
        }
    }

    /// Returns this position expressed in degrees.
    pub fn to_degrees(&self) -> Self {
        match self.unit {
            AngleUnit::Degrees => *self,
            AngleUnit::Radians => Self::degrees(self.lat.to_degrees(), self.lon.to_degrees()),
        }
    }
}

impl std::fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let deg = self.to_degrees();
        let ns = if deg.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if deg.lon >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.2}°{} {:.2}°{}",
            deg.lat.abs(),
            ns,
            deg.lon.abs(),
            ew
        )
    }
}
