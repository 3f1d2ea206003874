//! Mode-aware view geometry.

use super::{
    geo_to_azimuthal_pixel, geo_to_mercator_pixel, mercator_pixel_to_geo, pixel_to_azimuthal_geo,
    AzimuthalCenter, BufferSize, PixelPosition, ProjectionMode,
};
use crate::geo::GeoPosition;

/// Geometry of one rendered view: mode, canvas size and station.
///
/// Used to place markers (station, sub-solar point, satellites) on whatever
/// view is currently displayed without the caller caring which projection
/// is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewGeometry {
    mode: ProjectionMode,
    size: BufferSize,
    center: AzimuthalCenter,
}

impl ViewGeometry {
    /// Create the geometry for a view.
    pub fn new(mode: ProjectionMode, size: BufferSize, station: GeoPosition) -> Self {
        Self {
            mode,
            size,
            center: AzimuthalCenter::new(station),
        }
    }

    /// The projection mode.
    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    /// The canvas size.
    pub fn size(&self) -> BufferSize {
        self.size
    }

    /// The station in radians, with its precomputed trig.
    pub fn center(&self) -> &AzimuthalCenter {
        &self.center
    }

    /// Longitude at the centre column of a Mercator view, in radians.
    pub fn central_longitude(&self) -> f64 {
        match self.mode {
            ProjectionMode::Mercator => 0.0,
            ProjectionMode::StationMercator | ProjectionMode::StationAzimuthal => {
                self.center.geo.lon()
            }
        }
    }

    /// Pixel at which a geocoordinate is drawn in this view.
    pub fn geo_to_pixel(&self, geo: GeoPosition) -> PixelPosition {
        if self.mode.is_azimuthal() {
            geo_to_azimuthal_pixel(geo, &self.center, self.size)
        } else {
            geo_to_mercator_pixel(geo, self.size, self.central_longitude())
        }
    }

    /// Geocoordinate shown at a pixel, or `None` outside the azimuthal disks.
    pub fn pixel_to_geo(&self, x: u32, y: u32) -> Option<GeoPosition> {
        if self.mode.is_azimuthal() {
            pixel_to_azimuthal_geo(x, y, self.size, &self.center)
        } else {
            Some(mercator_pixel_to_geo(
                x,
                y,
                self.size,
                self.central_longitude(),
            ))
        }
    }
}
