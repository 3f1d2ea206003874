//! Equirectangular ("Mercator" in the map catalog) pixel mapping.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::{BufferSize, PixelPosition};
use crate::geo::{normalize_lon, GeoPosition};

/// Maps a Mercator pixel to a geocoordinate in radians.
///
/// `lon = 2π·x/W − π + central_lon`, `lat = π/2 − π·y/H`. A `central_lon` of
/// zero gives the plain map; the station-centred map passes the station
/// longitude.
#[inline]
pub fn mercator_pixel_to_geo(x: u32, y: u32, size: BufferSize, central_lon: f64) -> GeoPosition {
    let w = size.width as f64;
    let h = size.height as f64;
    let lon = normalize_lon(TAU * x as f64 / w - PI + central_lon);
    let lat = FRAC_PI_2 - PI * y as f64 / h;
    GeoPosition::radians(lat, lon)
}

/// Maps a geocoordinate to the nearest Mercator pixel.
///
/// The column wraps modulo the image width; the row is clamped to the image.
#[inline]
pub fn geo_to_mercator_pixel(
    geo: GeoPosition,
    size: BufferSize,
    central_lon: f64,
) -> PixelPosition {
    let g = geo.to_radians();
    let w = size.width as f64;
    let h = size.height as f64;

    let rel_lon = normalize_lon(g.lon() - central_lon);
    let x = ((rel_lon + PI) * w / TAU).round() as i64;
    let y = ((FRAC_PI_2 - g.lat()) * h / PI).round() as i64;

    let x = x.rem_euclid(size.width.max(1) as i64) as i32;
    let y = y.clamp(0, size.height.saturating_sub(1) as i64) as i32;
    PixelPosition { x, y }
}
