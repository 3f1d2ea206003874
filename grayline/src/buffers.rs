//! RGBA pixel buffers and row-parallel scanning.
//!
//! Buffers are plain [`image::RgbaImage`]s. Maps come in day/night pairs:
//! the raw Mercator sources loaded from the cache, and the projected pairs
//! the pipeline derives from them.

use image::RgbaImage;
use rayon::prelude::*;

use crate::abort::AbortFlag;
use crate::projection::{BufferSize, ViewGeometry};

/// RGBA pixel buffer.
pub type ImageBuffer = RgbaImage;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Fully transparent pixel, used outside the azimuthal disks.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// A day map and a night map of identical size.
#[derive(Debug, Clone)]
pub struct DayNightPair {
    pub day: ImageBuffer,
    pub night: ImageBuffer,
}

/// The raw Mercator day/night maps that feed the pipeline.
pub type SourceMaps = DayNightPair;

impl DayNightPair {
    /// Pair two existing buffers without validation.
    pub fn new(day: ImageBuffer, night: ImageBuffer) -> Self {
        Self { day, night }
    }

    /// Allocate a transparent pair of the given size.
    pub fn blank(size: BufferSize) -> Self {
        Self {
            day: ImageBuffer::new(size.width, size.height),
            night: ImageBuffer::new(size.width, size.height),
        }
    }

    /// Size of the day buffer.
    pub fn size(&self) -> BufferSize {
        BufferSize::new(self.day.width(), self.day.height())
    }

    /// Size of the night buffer.
    pub fn night_size(&self) -> BufferSize {
        BufferSize::new(self.night.width(), self.night.height())
    }

    /// Returns true if both buffers have the same dimensions.
    pub fn dimensions_match(&self) -> bool {
        self.size() == self.night_size()
    }

    /// Keep this pair if it already has `size`, otherwise allocate a new one.
    pub fn reuse_or_blank(existing: Option<Self>, size: BufferSize) -> Self {
        match existing {
            Some(pair) if pair.dimensions_match() && pair.size() == size => pair,
            _ => Self::blank(size),
        }
    }
}

/// Source maps resampled into both projections for one view.
#[derive(Debug, Clone)]
pub struct ProjectedMaps {
    /// Geometry the pairs were projected for.
    pub view: ViewGeometry,
    pub mercator: DayNightPair,
    pub azimuthal: DayNightPair,
}

impl ProjectedMaps {
    /// Allocate transparent pairs for a view.
    pub fn blank(view: ViewGeometry) -> Self {
        Self {
            view,
            mercator: DayNightPair::blank(view.size()),
            azimuthal: DayNightPair::blank(view.size()),
        }
    }

    /// Reuse `existing` buffers when their size matches the view.
    pub fn reuse_or_blank(existing: Option<Self>, view: ViewGeometry) -> Self {
        match existing {
            Some(maps) => Self {
                view,
                mercator: DayNightPair::reuse_or_blank(Some(maps.mercator), view.size()),
                azimuthal: DayNightPair::reuse_or_blank(Some(maps.azimuthal), view.size()),
            },
            None => Self::blank(view),
        }
    }
}

/// Fill `out` row by row in parallel.
///
/// `fill_row(y, row)` receives one scan line of raw RGBA bytes. Rows check
/// `abort` before starting, so an abort is honoured within one scan line per
/// worker. Returns true if every row was filled.
pub fn fill_rows<F>(out: &mut ImageBuffer, abort: &AbortFlag, fill_row: F) -> bool
where
    F: Fn(u32, &mut [u8]) + Sync,
{
    let row_len = out.width() as usize * BYTES_PER_PIXEL;
    if row_len == 0 || out.height() == 0 {
        return !abort.is_raised();
    }

    let raw: &mut [u8] = out;
    raw.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            if abort.is_raised() {
                return;
            }
            fill_row(y as u32, row);
        });

    !abort.is_raised()
}

/// Fill a day/night pair row by row in parallel, one geometry pass per row.
///
/// Same abort contract as [`fill_rows`].
pub fn fill_pair_rows<F>(out: &mut DayNightPair, abort: &AbortFlag, fill_row: F) -> bool
where
    F: Fn(u32, &mut [u8], &mut [u8]) + Sync,
{
    let row_len = out.day.width() as usize * BYTES_PER_PIXEL;
    if row_len == 0 || out.day.height() == 0 {
        return !abort.is_raised();
    }

    let day: &mut [u8] = &mut out.day;
    let night: &mut [u8] = &mut out.night;
    day.par_chunks_mut(row_len)
        .zip(night.par_chunks_mut(row_len))
        .enumerate()
        .for_each(|(y, (day_row, night_row))| {
            if abort.is_raised() {
                return;
            }
            fill_row(y as u32, day_row, night_row);
        });

    !abort.is_raised()
}

/// Copy one RGBA pixel out of a source buffer.
#[inline]
pub fn pixel_at(buffer: &ImageBuffer, x: u32, y: u32) -> [u8; 4] {
    buffer.get_pixel(x, y).0
}
