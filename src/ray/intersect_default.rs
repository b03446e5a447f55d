//! This file contains the scalar slab test and the safe reciprocal it relies on.

use crate::aabb::Aabb;
use crate::utils::{fast_max, fast_min};
use crate::{Point3, Real, Vector3};

/// Magnitude below which a direction component is treated as zero by [`safe_inverse`].
pub const SAFE_INVERSE_EPSILON: Real = 1e-8;

/// Relative amount by which the exit distance of the slab test is widened before it is
/// compared with the entry distance. Rays through an edge or corner lying on a box face
/// would otherwise round to an exit just before the entry and prune a box whose triangle
/// the ray hits.
pub const SLAB_TOLERANCE: Real = 1e-5;

/// Reciprocal which never divides by (almost) zero.
///
/// Returns `1 / x`, unless `|x| <= SAFE_INVERSE_EPSILON`, in which case the reciprocal of
/// the epsilon with the sign of `x` is returned. Finite input therefore never yields NaN or
/// an infinity, and the sign of the axis is preserved.
///
/// # Examples
/// ```
/// use meshbvh::ray::{safe_inverse, SAFE_INVERSE_EPSILON};
///
/// assert_eq!(safe_inverse(4.0), 0.25);
/// assert_eq!(safe_inverse(0.0), 1.0 / SAFE_INVERSE_EPSILON);
/// assert_eq!(safe_inverse(-0.0), -1.0 / SAFE_INVERSE_EPSILON);
/// ```
#[inline]
pub fn safe_inverse(x: Real) -> Real {
    if x.abs() <= SAFE_INVERSE_EPSILON {
        (1.0 / SAFE_INVERSE_EPSILON).copysign(x)
    } else {
        1.0 / x
    }
}

/// Component-wise [`safe_inverse`] of a direction.
pub fn inv_dir(direction: &Vector3) -> Vector3 {
    direction.map(safe_inverse)
}

/// Slab test of a ray, given by its origin and reciprocal direction, against `aabb`.
///
/// For every axis the parameters at which the ray crosses the two bounding planes are
/// computed. `tmin` is the largest entry and `tmax` the smallest exit over all axes, the
/// latter widened by [`SLAB_TOLERANCE`] of its magnitude. The box is hit iff
/// `tmax >= tmin`, `tmin < best_t` and `tmax > 0`; the entry distance `tmin` is returned
/// in that case. It is negative when the origin lies inside the box.
#[inline]
pub fn slab_test(
    origin: &Point3,
    inv_direction: &Vector3,
    aabb: &Aabb,
    best_t: Real,
) -> Option<Real> {
    let lbr = (aabb.min - *origin).component_mul(inv_direction);
    let rtr = (aabb.max - *origin).component_mul(inv_direction);

    let mut tmin = fast_min(lbr.x, rtr.x);
    let mut tmax = fast_max(lbr.x, rtr.x);

    tmin = fast_max(tmin, fast_min(lbr.y, rtr.y));
    tmax = fast_min(tmax, fast_max(lbr.y, rtr.y));

    tmin = fast_max(tmin, fast_min(lbr.z, rtr.z));
    tmax = fast_min(tmax, fast_max(lbr.z, rtr.z));
    tmax += tmax.abs() * SLAB_TOLERANCE;

    if tmax >= tmin && tmin < best_t && tmax > 0.0 {
        Some(tmin)
    } else {
        None
    }
}
