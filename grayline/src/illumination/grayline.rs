//! Gray-line alpha model.

use std::fmt;
use std::str::FromStr;

use crate::geo::GeoPosition;

/// Day-layer opacity kept on the night side.
///
/// Empirically tuned so the night map never sits under a fully black day
/// layer; not derivable from the geometry.
pub const GRAYLINE_FLOOR_ALPHA: f64 = 0.0313;

/// Default exponent of the twilight falloff.
pub const DEFAULT_GRAYLINE_SHARPNESS: f64 = 0.75;

/// Width of the twilight band, by sun depression below the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TwilightBand {
    /// Sun up to 6° below the horizon.
    Civil,
    /// Sun up to 12° below the horizon.
    #[default]
    Nautical,
    /// Sun up to 18° below the horizon.
    Astronomical,
}

impl TwilightBand {
    /// Sun depression at which night begins, in degrees.
    pub fn depression_deg(&self) -> f64 {
        match self {
            TwilightBand::Civil => 6.0,
            TwilightBand::Nautical => 12.0,
            TwilightBand::Astronomical => 18.0,
        }
    }

    /// `cosΔσ` at which night begins. Always negative.
    pub fn threshold(&self) -> f64 {
        -self.depression_deg().to_radians().sin()
    }

    /// Name used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            TwilightBand::Civil => "civil",
            TwilightBand::Nautical => "nautical",
            TwilightBand::Astronomical => "astronomical",
        }
    }
}

impl fmt::Display for TwilightBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown twilight band name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown twilight band '{0}' (expected civil, nautical or astronomical)")]
pub struct UnknownTwilightBand(pub String);

impl FromStr for TwilightBand {
    type Err = UnknownTwilightBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "civil" => Ok(TwilightBand::Civil),
            "nautical" => Ok(TwilightBand::Nautical),
            "astronomical" => Ok(TwilightBand::Astronomical),
            _ => Err(UnknownTwilightBand(s.to_string())),
        }
    }
}

/// Tunable parameters of the gray-line mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayLineSettings {
    /// Twilight band width.
    pub band: TwilightBand,
    /// Exponent `p` of the falloff; larger values keep the twilight brighter longer.
    pub sharpness: f64,
    /// Minimum day-layer opacity.
    pub floor_alpha: f64,
}

impl Default for GrayLineSettings {
    fn default() -> Self {
        Self {
            band: TwilightBand::default(),
            sharpness: DEFAULT_GRAYLINE_SHARPNESS,
            floor_alpha: GRAYLINE_FLOOR_ALPHA,
        }
    }
}

impl GrayLineSettings {
    /// Set the twilight band.
    pub fn with_band(mut self, band: TwilightBand) -> Self {
        self.band = band;
        self
    }

    /// Set the falloff exponent.
    pub fn with_sharpness(mut self, sharpness: f64) -> Self {
        self.sharpness = sharpness;
        self
    }

    /// Day-layer opacity for a given `cosΔσ`.
    ///
    /// Fully lit at `cosΔσ ≥ 0`, the floor at or below the band threshold,
    /// and `1 − (cosΔσ/threshold)^p` clamped to `[floor, 1]` in between.
    #[inline]
    pub fn alpha(&self, cos_delta_sigma: f64) -> f64 {
        if cos_delta_sigma >= 0.0 {
            return 1.0;
        }
        let threshold = self.band.threshold();
        if cos_delta_sigma <= threshold {
            return self.floor_alpha;
        }
        let ratio = cos_delta_sigma / threshold;
        (1.0 - ratio.powf(self.sharpness)).clamp(self.floor_alpha, 1.0)
    }
}

/// Precomputed sub-solar point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarGeometry {
    /// Sub-solar point in radians.
    pub sub_solar: GeoPosition,
    sin_lat: f64,
    cos_lat: f64,
}

impl SolarGeometry {
    /// Precompute from a sub-solar point in any unit.
    pub fn new(sub_solar: GeoPosition) -> Self {
        let sub_solar = sub_solar.to_radians();
        Self {
            sub_solar,
            sin_lat: sub_solar.lat().sin(),
            cos_lat: sub_solar.lat().cos(),
        }
    }

    /// Cosine of the angle between the sun and a point, given the point's
    /// `sin`/`cos` latitude and longitude in radians.
    ///
    /// `cosΔσ = sin latS sin latE + cos latS cos latE cos|lonS − lonE|`
    #[inline]
    pub fn cos_delta_sigma(&self, sin_lat: f64, cos_lat: f64, lon: f64) -> f64 {
        self.sin_lat * sin_lat
            + self.cos_lat * cos_lat * (self.sub_solar.lon() - lon).abs().cos()
    }

    /// [`Self::cos_delta_sigma`] for a position.
    pub fn cos_delta_sigma_at(&self, geo: GeoPosition) -> f64 {
        let g = geo.to_radians();
        self.cos_delta_sigma(g.lat().sin(), g.lat().cos(), g.lon())
    }
}
