//! Spherical triangle solver.
//!
//! Every azimuthal transform in the crate goes through [`solve_sphere`], in
//! both directions, so it must stay deterministic: no caching, no fast-math
//! shortcuts, the same expression order for every caller.

use std::f64::consts::PI;

/// Below this value of `sin(c)` the triangle is treated as collapsed onto a pole.
pub const DEGENERATE_SIN_C: f64 = 1e-7;

/// Magnitude under which both atan2 operands count as zero.
const ATAN2_ZERO: f64 = 1e-12;

/// Solves a spherical triangle from one angle, its adjacent side and the third side.
///
/// Label the vertices P, S, T. `a` is the angle at S, `b` the side ST and
/// `cos_c`/`sin_c` the cosine and sine of side PS. Returns the cosine of side
/// PT (opposite `a`) and the angle at P, in (-π, π].
///
/// With P at the north pole and S an observer this yields, for a bearing `a`
/// and a great-circle distance `b`, the target's co-latitude and its
/// longitude offset from the observer. Called with P/S swapped roles (angle =
/// longitude difference, side = target co-latitude) it yields distance and
/// bearing instead.
///
/// When `sin_c < 1e-7` the triangle collapses onto the pole and the bearing is
/// `a` for the south pole (`cos_c < 0`) or `π − a` for the north pole.
#[inline]
pub fn solve_sphere(a: f64, b: f64, cos_c: f64, sin_c: f64) -> (f64, f64) {
    let cos_b = b.cos();
    let sin_b = b.sin();

    let cos_a_side = (cos_b * cos_c + sin_b * sin_c * a.cos()).clamp(-1.0, 1.0);

    let bearing = if sin_c < DEGENERATE_SIN_C {
        if cos_c < 0.0 {
            a
        } else {
            PI - a
        }
    } else {
        let y = a.sin() * sin_b * sin_c;
        let x = cos_b - cos_c * cos_a_side;
        if y.abs() < ATAN2_ZERO && x.abs() < ATAN2_ZERO {
            if x >= 0.0 {
                0.0
            } else {
                PI
            }
        } else {
            y.atan2(x)
        }
    };

    (cos_a_side, bearing)
}
