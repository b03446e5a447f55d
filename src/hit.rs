//! This module defines [`HitInfo`], the result of a closest-hit ray query.

use crate::{Real, Vector3};

/// The result of intersecting a ray with a triangle, a subtree, or a whole [`Bvh`].
///
/// A fresh `HitInfo` is a miss whose `t` is [`HitInfo::NO_HIT_T`], so any real hit
/// compares closer than it.
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitInfo {
    /// Whether anything was hit.
    pub is_hit: bool,

    /// Distance along the ray to the hit point. Smaller is closer.
    pub t: Real,

    /// Surface normal at the hit point.
    pub normal: Vector3,
}

impl HitInfo {
    /// Distance carried by a [`HitInfo`] which has not hit anything yet.
    pub const NO_HIT_T: Real = 1e10;

    /// Creates a hit at distance `t` with the given surface `normal`.
    pub fn new(t: Real, normal: Vector3) -> HitInfo {
        HitInfo {
            is_hit: true,
            t,
            normal,
        }
    }

    /// Creates a miss.
    pub fn miss() -> HitInfo {
        HitInfo {
            is_hit: false,
            t: Self::NO_HIT_T,
            normal: Vector3::zeros(),
        }
    }

    /// Returns whichever of `self` and `other` is the closer hit.
    /// `self` wins ties and is kept if `other` is a miss.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::hit::HitInfo;
    /// use meshbvh::Vector3;
    ///
    /// let near = HitInfo::new(1.0, Vector3::x());
    /// let far = HitInfo::new(2.0, Vector3::y());
    ///
    /// assert_eq!(far.closer(near), near);
    /// assert_eq!(near.closer(HitInfo::miss()), near);
    /// assert!(!HitInfo::miss().closer(HitInfo::miss()).is_hit);
    /// ```
    pub fn closer(self, other: HitInfo) -> HitInfo {
        if other.is_hit && other.t < self.t {
            other
        } else {
            self
        }
    }
}

impl Default for HitInfo {
    fn default() -> HitInfo {
        HitInfo::miss()
    }
}
