//! Day/night illumination ("gray line") compositing.
//!
//! The night map is the background layer; the day map is drawn over it with
//! a per-pixel opacity derived from the angle between the pixel and the
//! sub-solar point.
//!
//! # Example
//!
//! ```ignore
//! use grayline::illumination::{GrayLineSettings, Illuminator};
//!
//! let illuminator = Illuminator::at(GrayLineSettings::default(), chrono::Utc::now());
//! if let Some(composites) = illuminator.composite(&projected, &abort) {
//!     upload(composites.mercator);
//! }
//! ```

mod ephemeris;
mod grayline;

pub use ephemeris::{greenwich_mean_sidereal_time, julian_date, sub_solar_point, J2000_JULIAN_DATE};
pub use grayline::{
    GrayLineSettings, SolarGeometry, TwilightBand, UnknownTwilightBand,
    DEFAULT_GRAYLINE_SHARPNESS, GRAYLINE_FLOOR_ALPHA,
};

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use chrono::{DateTime, Utc};

use crate::abort::AbortFlag;
use crate::buffers::{fill_rows, pixel_at, ImageBuffer, ProjectedMaps, BYTES_PER_PIXEL, TRANSPARENT};
use crate::geo::{normalize_lon, GeoPosition};
use crate::projection::pixel_to_azimuthal_geo;

/// The two illuminated views of one frame.
#[derive(Debug, Clone)]
pub struct Composites {
    pub mercator: ImageBuffer,
    pub azimuthal: ImageBuffer,
}

/// Applies the gray-line mask for one sun position.
#[derive(Debug, Clone, Copy)]
pub struct Illuminator {
    settings: GrayLineSettings,
    sun: SolarGeometry,
}

impl Illuminator {
    /// Create an illuminator for a known sub-solar point.
    pub fn new(settings: GrayLineSettings, sub_solar: GeoPosition) -> Self {
        Self {
            settings,
            sun: SolarGeometry::new(sub_solar),
        }
    }

    /// Create an illuminator for the sun position at `now`.
    pub fn at(settings: GrayLineSettings, now: DateTime<Utc>) -> Self {
        Self::new(settings, sub_solar_point(now))
    }

    /// The sub-solar point in radians.
    pub fn sub_solar(&self) -> GeoPosition {
        self.sun.sub_solar
    }

    /// The mask settings.
    pub fn settings(&self) -> &GrayLineSettings {
        &self.settings
    }

    /// Day-layer opacity at a position.
    pub fn alpha_at(&self, geo: GeoPosition) -> f64 {
        self.settings.alpha(self.sun.cos_delta_sigma_at(geo))
    }

    /// Composite both projected pairs.
    ///
    /// Returns `None` if `abort` was raised before every row was written. The
    /// flag is only polled here, never cleared.
    pub fn composite(&self, projected: &ProjectedMaps, abort: &AbortFlag) -> Option<Composites> {
        let mercator = self.composite_mercator(projected, abort)?;
        let azimuthal = self.composite_azimuthal(projected, abort)?;
        Some(Composites {
            mercator,
            azimuthal,
        })
    }

    fn composite_mercator(
        &self,
        projected: &ProjectedMaps,
        abort: &AbortFlag,
    ) -> Option<ImageBuffer> {
        let pair = &projected.mercator;
        let size = pair.size();
        let central_lon = projected.view.central_longitude();
        let w = size.width as f64;
        let h = size.height as f64;

        let mut out = ImageBuffer::new(size.width, size.height);
        let done = fill_rows(&mut out, abort, |y, row| {
            let lat = FRAC_PI_2 - PI * y as f64 / h;
            let (sin_lat, cos_lat) = lat.sin_cos();
            for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let lon = normalize_lon(TAU * x as f64 / w - PI + central_lon);
                let alpha = self
                    .settings
                    .alpha(self.sun.cos_delta_sigma(sin_lat, cos_lat, lon));
                let day = pixel_at(&pair.day, x as u32, y);
                let night = pixel_at(&pair.night, x as u32, y);
                px.copy_from_slice(&blend(day, night, alpha));
            }
        });
        done.then_some(out)
    }

    fn composite_azimuthal(
        &self,
        projected: &ProjectedMaps,
        abort: &AbortFlag,
    ) -> Option<ImageBuffer> {
        let pair = &projected.azimuthal;
        let size = pair.size();
        let center = projected.view.center();

        let mut out = ImageBuffer::new(size.width, size.height);
        let done = fill_rows(&mut out, abort, |y, row| {
            for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let x = x as u32;
                let rgba = match pixel_to_azimuthal_geo(x, y, size, center) {
                    Some(geo) => {
                        let alpha = self.alpha_at(geo);
                        blend(pixel_at(&pair.day, x, y), pixel_at(&pair.night, x, y), alpha)
                    }
                    None => TRANSPARENT,
                };
                px.copy_from_slice(&rgba);
            }
        });
        done.then_some(out)
    }
}

/// Draw `day` over `night` with opacity `alpha`.
#[inline]
pub fn blend(day: [u8; 4], night: [u8; 4], alpha: f64) -> [u8; 4] {
    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = day[c] as f64 * alpha + night[c] as f64 * (1.0 - alpha);
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}
