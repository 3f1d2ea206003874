//! Geographic math primitives.
//!
//! Provides the [`GeoPosition`] value type, the shared spherical-triangle
//! solver used by every azimuthal transform, and small angle helpers.

mod sphere;
mod types;

pub use sphere::{solve_sphere, DEGENERATE_SIN_C};
pub use types::{AngleUnit, GeoPosition, MAX_LAT_DEG, MAX_LON_DEG};

use std::f64::consts::{PI, TAU};

/// Longitude assigned to the antipode of a point on the prime meridian.
///
/// `lon == 0` has no sign to flip, so its antipode is pinned to `+π` and never
/// `-π`. As a consequence `antipode(antipode(p))` returns `+π` for a point
/// at `-π`.
pub const ANTIPODE_OF_PRIME_MERIDIAN: f64 = PI;

/// Converts degrees to radians.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Converts radians to degrees.
#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Normalizes a longitude in radians into (-π, π].
#[inline]
pub fn normalize_lon(lon: f64) -> f64 {
    let mut l = lon % TAU;
    if l > PI {
        l -= TAU;
    } else if l <= -PI {
        l += TAU;
    }
    l
}

/// Returns the point diametrically opposite `geo`, in radians.
///
/// Latitude is negated and longitude moves half a turn towards zero
/// (`lon − sign(lon)·π`), so the result is always π away from `geo` and is
/// the centre of the far azimuthal disk. A longitude of exactly zero maps to
/// [`ANTIPODE_OF_PRIME_MERIDIAN`].
pub fn antipode(geo: GeoPosition) -> GeoPosition {
    let rad = geo.to_radians();
    let lon = rad.lon();
    let anti_lon = if lon == 0.0 {
        ANTIPODE_OF_PRIME_MERIDIAN
    } else {
        lon - lon.signum() * PI
    };
    GeoPosition::radians(-rad.lat(), anti_lon)
}

/// Great-circle angular distance between two positions, in radians.
pub fn angular_distance(a: GeoPosition, b: GeoPosition) -> f64 {
    let a = a.to_radians();
    let b = b.to_radians();
    let cos_d = a.lat().sin() * b.lat().sin()
        + a.lat().cos() * b.lat().cos() * (a.lon() - b.lon()).cos();
    cos_d.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_degree_radian_helpers() {
        assert!((deg_to_rad(180.0) - PI).abs() < 1e-15);
        assert!((rad_to_deg(FRAC_PI_2) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_geo_position_clamps_degrees() {
        let p = GeoPosition::degrees(95.0, -200.0);
        assert_eq!(p.lat(), 90.0);
        assert_eq!(p.lon(), -180.0);
    }

    #[test]
    fn test_geo_position_clamps_radians() {
        let p = GeoPosition::radians(-2.0, 4.0);
        assert_eq!(p.lat(), -FRAC_PI_2);
        assert_eq!(p.lon(), PI);
    }

    #[test]
    fn test_conversion_does_not_mutate() {
        let deg = GeoPosition::degrees(45.0, -75.0);
        let rad = deg.to_radians();
        assert_eq!(deg.unit(), AngleUnit::Degrees);
        assert_eq!(rad.unit(), AngleUnit::Radians);
        assert_eq!(deg.lat(), 45.0);

        let back = rad.to_degrees();
        assert!((back.lat() - 45.0).abs() < 1e-12);
        assert!((back.lon() + 75.0).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let p = GeoPosition::degrees(45.5, -75.25);
        assert_eq!(p.to_string(), "45.50°N 75.25°W");
    }

    #[test]
    fn test_normalize_lon_range() {
        assert!((normalize_lon(2.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert!((normalize_lon(-PI) - PI).abs() < 1e-12);
        assert!((normalize_lon(-3.5 * PI) - 0.5 * PI).abs() < 1e-12);
        assert_eq!(normalize_lon(0.25), 0.25);
    }

    #[test]
    fn test_antipode_basic() {
        let a = antipode(GeoPosition::degrees(45.0, 90.0)).to_degrees();
        assert!((a.lat() + 45.0).abs() < 1e-12);
        assert!((a.lon() + 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_antipode_prime_meridian_maps_to_positive_pi() {
        let a = antipode(GeoPosition::radians(0.3, 0.0));
        assert_eq!(a.lon(), PI);
        assert_eq!(a.lat(), -0.3);
    }

    #[test]
    fn test_antipode_minus_pi_is_the_boundary_case() {
        let p = GeoPosition::radians(0.1, -PI);
        let twice = antipode(antipode(p));
        assert_eq!(twice.lon(), PI);
    }

    #[test]
    fn test_antipode_is_half_a_world_away() {
        let p = GeoPosition::degrees(12.0, -33.0);
        let d = angular_distance(p, antipode(p));
        assert!((d - PI).abs() < 1e-6);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_antipode_involution(
                lat in -FRAC_PI_2..FRAC_PI_2,
                lon in -3.14159..PI
            ) {
                // -π is excluded: it is the documented boundary case
                let p = GeoPosition::radians(lat, lon);
                let twice = antipode(antipode(p));
                prop_assert!((twice.lat() - lat).abs() < 1e-12);
                prop_assert!(
                    (twice.lon() - lon).abs() < 1e-12,
                    "lon {} came back as {}",
                    lon,
                    twice.lon()
                );
            }

            #[test]
            fn test_normalize_lon_in_half_open_range(lon in -50.0..50.0_f64) {
                let l = normalize_lon(lon);
                prop_assert!(l > -PI && l <= PI);
                let turns = (l - lon) / TAU;
                prop_assert!((turns - turns.round()).abs() < 1e-9);
            }
        }
    }
}
