//! Low-precision solar ephemeris.
//!
//! Good to roughly 0.01° over several decades around J2000, far below the size
//! of a map pixel.

use chrono::{DateTime, Utc};

use crate::geo::{normalize_lon, GeoPosition};

/// Julian date of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000_JULIAN_DATE: f64 = 2_451_545.0;

/// Julian date of the Unix epoch.
const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const GMST_BASE_DEG: f64 = 280.460_618_37;
const GMST_ROTATION_PER_DAY: f64 = 360.985_647_366_29;
const GMST_CORRECTION: f64 = 0.000_387_933;

/// Julian date of an instant.
pub fn julian_date(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JULIAN_DATE
}

/// Greenwich mean sidereal time in radians, [0, 2π).
pub fn greenwich_mean_sidereal_time(t: DateTime<Utc>) -> f64 {
    let days = julian_date(t) - J2000_JULIAN_DATE;
    let centuries = days / DAYS_PER_JULIAN_CENTURY;
    let gmst_deg = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38_710_000.0;
    gmst_deg.rem_euclid(360.0).to_radians()
}

/// Geocoordinate directly beneath the sun at `now`, in radians.
///
/// Mean longitude and mean anomaly give the ecliptic longitude; with the
/// obliquity that yields right ascension and declination. The sub-solar
/// latitude is the declination, its longitude the right ascension minus
/// Greenwich sidereal time.
pub fn sub_solar_point(now: DateTime<Utc>) -> GeoPosition {
    let n = julian_date(now) - J2000_JULIAN_DATE;

    let mean_longitude = (280.460 + 0.985_647_4 * n).rem_euclid(360.0);
    let mean_anomaly = (357.528 + 0.985_600_3 * n).rem_euclid(360.0).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();

    let right_ascension =
        (obliquity.cos() * ecliptic_longitude.sin()).atan2(ecliptic_longitude.cos());
    let declination = (obliquity.sin() * ecliptic_longitude.sin()).asin();

    let lon = normalize_lon(right_ascension - greenwich_mean_sidereal_time(now));
    GeoPosition::radians(declination, lon)
}
