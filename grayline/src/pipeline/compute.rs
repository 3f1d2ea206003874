//! Background computations run by the pipeline.
//!
//! Both stages fan rows out on rayon and poll the generation's abort flag
//! once per row. When a stage ends it acknowledges the flag, so a raised
//! flag is cleared by exactly one observer.

use crate::abort::AbortFlag;
use crate::buffers::{
    fill_pair_rows, pixel_at, ProjectedMaps, SourceMaps, BYTES_PER_PIXEL, TRANSPARENT,
};
use crate::geo::GeoPosition;
use crate::illumination::{Composites, Illuminator};
use crate::projection::{
    geo_to_mercator_pixel, mercator_pixel_to_geo, pixel_to_azimuthal_geo, BufferSize,
};

/// Size of the derived buffers for a viewport and source size.
///
/// Derived canvases are always twice as wide as they are tall (the azimuthal
/// layout needs two square disks side by side). The width is the largest
/// even value that fits the viewport and does not exceed the source width.
/// An empty viewport means "native resolution".
pub fn derived_size(viewport: BufferSize, source: BufferSize) -> BufferSize {
    let mut width = source.width.min(source.height.saturating_mul(2));
    if !viewport.is_empty() {
        width = width
            .min(viewport.width)
            .min(viewport.height.saturating_mul(2));
    }
    let width = width - width % 2;
    BufferSize::new(width, width / 2)
}

/// Resample the source pair into both derived projections.
///
/// Nearest-neighbour: every destination pixel is mapped to a geocoordinate
/// and looked up in the Mercator sources. Azimuthal pixels outside the disks
/// are left transparent. Returns true if the scan completed without an
/// abort being observed.
pub fn project_maps(sources: &SourceMaps, out: &mut ProjectedMaps, abort: &AbortFlag) -> bool {
    let completed =
        resample_mercator(sources, out, abort) && resample_azimuthal(sources, out, abort);
    let aborted = abort.acknowledge();
    completed && !aborted
}

/// Composite the projected pair with the gray-line mask.
///
/// Returns `None` if an abort was observed.
pub fn illuminate(
    illuminator: &Illuminator,
    projected: &ProjectedMaps,
    abort: &AbortFlag,
) -> Option<Composites> {
    let composites = illuminator.composite(projected, abort);
    let aborted = abort.acknowledge();
    if aborted {
        None
    } else {
        composites
    }
}

fn source_pixel(sources: &SourceMaps, geo: GeoPosition) -> ([u8; 4], [u8; 4]) {
    let p = geo_to_mercator_pixel(geo, sources.size(), 0.0);
    let (x, y) = (p.x as u32, p.y as u32);
    (pixel_at(&sources.day, x, y), pixel_at(&sources.night, x, y))
}

fn resample_mercator(sources: &SourceMaps, out: &mut ProjectedMaps, abort: &AbortFlag) -> bool {
    let size = out.mercator.size();
    let central_lon = out.view.central_longitude();

    fill_pair_rows(&mut out.mercator, abort, |y, day_row, night_row| {
        let pixels = day_row
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(night_row.chunks_exact_mut(BYTES_PER_PIXEL));
        for (x, (day_px, night_px)) in pixels.enumerate() {
            let geo = mercator_pixel_to_geo(x as u32, y, size, central_lon);
            let (day, night) = source_pixel(sources, geo);
            day_px.copy_from_slice(&day);
            night_px.copy_from_slice(&night);
        }
    })
}

fn resample_azimuthal(sources: &SourceMaps, out: &mut ProjectedMaps, abort: &AbortFlag) -> bool {
    let size = out.azimuthal.size();
    let center = *out.view.center();

    fill_pair_rows(&mut out.azimuthal, abort, |y, day_row, night_row| {
        let pixels = day_row
            .chunks_exact_mut(BYTES_PER_PIXEL)
            .zip(night_row.chunks_exact_mut(BYTES_PER_PIXEL));
        for (x, (day_px, night_px)) in pixels.enumerate() {
            let (day, night) = match pixel_to_azimuthal_geo(x as u32, y, size, &center) {
                Some(geo) => source_pixel(sources, geo),
                None => (TRANSPARENT, TRANSPARENT),
            };
            day_px.copy_from_slice(&day);
            night_px.copy_from_slice(&night);
        }
    })
}
