//! Axis Aligned Bounding Boxes.

use std::fmt;

use crate::axis::Axis;
use crate::utils::{fast_max, fast_min};
use crate::{Point3, Real, Vector3};

/// Aabb struct.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    /// Minimum coordinates
    pub min: Point3,

    /// Maximum coordinates
    pub max: Point3,
}

impl fmt::Display for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Min bound: {}; Max bound: {}", self.min, self.max)
    }
}

/// A trait implemented by things which can be bounded by an [`Aabb`].
pub trait Bounded {
    /// Returns the geometric bounds of this object in the form of an [`Aabb`].
    fn aabb(&self) -> Aabb;
}

impl Aabb {
    /// Creates a new [`Aabb`] with the given bounds.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::aabb::Aabb;
    /// use meshbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    /// assert_eq!(aabb.min.x, -1.0);
    /// assert_eq!(aabb.max.z, 1.0);
    /// ```
    pub fn with_bounds(min: Point3, max: Point3) -> Aabb {
        Aabb { min, max }
    }

    /// Creates a new empty [`Aabb`]. Growing it by any point yields the [`Aabb`] of that point.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::aabb::Aabb;
    ///
    /// let aabb = Aabb::empty();
    /// assert!(aabb.is_empty());
    /// ```
    pub fn empty() -> Aabb {
        Aabb {
            min: Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
            max: Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
        }
    }

    /// Returns true if the [`Aabb`] is empty, i.e. its minimum lies above its maximum on some axis.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns true if the point is inside the [`Aabb`], borders included.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::aabb::Aabb;
    /// use meshbvh::Point3;
    ///
    /// let aabb = Aabb::with_bounds(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    /// assert!(aabb.contains(&Point3::new(1.0, 0.0, -1.0)));
    /// assert!(!aabb.contains(&Point3::new(1.1, 0.0, 0.0)));
    /// ```
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Grows this [`Aabb`] in place so that it contains `point`.
    pub fn grow_mut(&mut self, point: &Point3) {
        self.min = Point3::new(
            fast_min(self.min.x, point.x),
            fast_min(self.min.y, point.y),
            fast_min(self.min.z, point.z),
        );
        self.max = Point3::new(
            fast_max(self.max.x, point.x),
            fast_max(self.max.y, point.y),
            fast_max(self.max.z, point.z),
        );
    }

    /// Returns a copy of this [`Aabb`] grown to contain `point`.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::aabb::Aabb;
    /// use meshbvh::Point3;
    ///
    /// let aabb = Aabb::empty()
    ///     .grow(&Point3::new(1.0, 2.0, 3.0))
    ///     .grow(&Point3::new(-1.0, 0.0, 5.0));
    /// assert_eq!(aabb.min, Point3::new(-1.0, 0.0, 3.0));
    /// assert_eq!(aabb.max, Point3::new(1.0, 2.0, 5.0));
    /// ```
    pub fn grow(&self, point: &Point3) -> Aabb {
        let mut aabb = *self;
        aabb.grow_mut(point);
        aabb
    }

    /// Joins `other` into this [`Aabb`] in place.
    pub fn join_mut(&mut self, other: &Aabb) {
        self.grow_mut(&other.min);
        self.grow_mut(&other.max);
    }

    /// Returns the smallest [`Aabb`] containing both `self` and `other`.
    pub fn join(&self, other: &Aabb) -> Aabb {
        let mut aabb = *self;
        aabb.join_mut(other);
        aabb
    }

    /// Returns the extent of this [`Aabb`] along every axis.
    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    /// Returns the center point of the [`Aabb`].
    pub fn center(&self) -> Point3 {
        self.min + (self.size() / 2.0)
    }

    /// Returns the axis along which the [`Aabb`] is stretched the most.
    /// Ties are resolved in favor of the earlier axis: X before Y before Z.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::aabb::Aabb;
    /// use meshbvh::axis::Axis;
    /// use meshbvh::Point3;
    ///
    /// let min = Point3::new(-100.0, 0.0, 0.0);
    /// let max = Point3::new(100.0, 0.0, 0.0);
    /// let aabb = Aabb::with_bounds(min, max);
    /// assert_eq!(aabb.largest_axis(), Axis::X);
    ///
    /// let cube = Aabb::with_bounds(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// assert_eq!(cube.largest_axis(), Axis::X);
    /// ```
    pub fn largest_axis(&self) -> Axis {
        let extent = self.size();
        let mut axis = Axis::X;
        if extent.y > extent.x {
            axis = Axis::Y;
        }
        if extent.z > extent[axis] {
            axis = Axis::Z;
        }
        axis
    }
}

impl Default for Aabb {
    fn default() -> Aabb {
        Aabb::empty()
    }
}
