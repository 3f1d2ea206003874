//! Two-disk azimuthal equidistant mapping.
//!
//! Canvas layout for a `W × H` buffer (`W = 2H`):
//!
//! ```text
//! +-----------+-----------+
//! |   near    |    far    |
//! |  (W/4,    |  (3W/4,   |
//! |   H/2)    |   H/2)    |
//! +-----------+-----------+
//! ```
//!
//! Each disk has radius `H/2` and covers 90° of arc from its centre. The far
//! disk is viewed through the Earth, so its horizontal offset is mirrored.

use std::f64::consts::{FRAC_PI_2, PI};

use super::{BufferSize, PixelPosition};
use crate::geo::{normalize_lon, solve_sphere, GeoPosition};

/// Precomputed centre of an azimuthal view.
///
/// Holding `sin`/`cos` of the centre latitude avoids recomputing them for
/// every pixel of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthalCenter {
    /// Centre in radians.
    pub geo: GeoPosition,
    /// `sin(lat)` of the centre, the cosine of its co-latitude.
    pub sin_lat: f64,
    /// `cos(lat)` of the centre, the sine of its co-latitude.
    pub cos_lat: f64,
}

impl AzimuthalCenter {
    /// Precompute the centre for a position in any unit.
    pub fn new(center: GeoPosition) -> Self {
        let geo = center.to_radians();
        Self {
            geo,
            sin_lat: geo.lat().sin(),
            cos_lat: geo.lat().cos(),
        }
    }
}

/// Maps an azimuthal canvas pixel to a geocoordinate in radians.
///
/// Returns `None` for pixels outside both disks (`r² > (H/2)²`). Pixels with
/// `x > W/2` belong to the antipodal disk.
#[inline]
pub fn pixel_to_azimuthal_geo(
    x: u32,
    y: u32,
    size: BufferSize,
    center: &AzimuthalCenter,
) -> Option<GeoPosition> {
    let w = size.width as f64;
    let radius = size.height as f64 / 2.0;
    let xf = x as f64;

    let far_side = xf > w / 2.0;
    let cx = if far_side { 3.0 * w / 4.0 } else { w / 4.0 };
    let dx = xf - cx;
    let dy = y as f64 - radius;

    let r2 = dx * dx + dy * dy;
    if r2 > radius * radius {
        return None;
    }

    let arc = r2.sqrt() / radius * FRAC_PI_2;
    let (distance, bearing) = if far_side {
        (PI - arc, (-dx).atan2(-dy))
    } else {
        (arc, dx.atan2(-dy))
    };

    let (cos_colat, dlon) = solve_sphere(bearing, distance, center.sin_lat, center.cos_lat);
    let lat = cos_colat.asin();
    let lon = normalize_lon(center.geo.lon() + dlon);
    Some(GeoPosition::radians(lat, lon))
}

/// Maps a geocoordinate to its azimuthal canvas pixel.
///
/// Points within 90° of the centre land on the near disk, the rest on the
/// far disk. The radius is clamped to `W/4 − 1` so a point never leaves its
/// hemisphere circle.
#[inline]
pub fn geo_to_azimuthal_pixel(
    geo: GeoPosition,
    center: &AzimuthalCenter,
    size: BufferSize,
) -> PixelPosition {
    let g = geo.to_radians();
    let w = size.width as f64;
    let h = size.height as f64;

    let dlon = normalize_lon(g.lon() - center.geo.lon());
    let (cos_distance, bearing) =
        solve_sphere(dlon, FRAC_PI_2 - g.lat(), center.sin_lat, center.cos_lat);
    let distance = cos_distance.acos();

    let (cx, arc, mirror) = if distance <= FRAC_PI_2 {
        (w / 4.0, distance, 1.0)
    } else {
        (3.0 * w / 4.0, PI - distance, -1.0)
    };

    let max_radius = (w / 4.0 - 1.0).max(0.0);
    let r = (arc / FRAC_PI_2 * (h / 2.0)).min(max_radius);

    let x = cx + mirror * r * bearing.sin();
    let y = h / 2.0 - r * bearing.cos();
    PixelPosition {
        x: x.round() as i32,
        y: y.round() as i32,
    }
}
