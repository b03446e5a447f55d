//! This module defines a Ray structure and intersection algorithms
//! for axis aligned bounding boxes and triangles.

use crate::aabb::Aabb;
use crate::hit::HitInfo;
use crate::triangle::TriangleRecord;
use crate::{Point3, Real, Vector3};

use super::intersect_default::{inv_dir, slab_test};

/// Determinant magnitude below which a ray counts as parallel to a triangle's plane.
pub const PARALLEL_EPSILON: Real = 1e-8;

/// A struct which defines a ray and some of its cached values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The ray origin.
    pub origin: Point3,

    /// The ray direction.
    pub direction: Vector3,

    /// Inverse (1/x) ray direction, made safe for zero components.
    /// Cached for use in [`Aabb`] intersections.
    ///
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub inv_direction: Vector3,
}

/// A struct which is returned by the [`Ray::intersects_triangle()`] method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Signed distance from the ray origin to the intersection point.
    pub distance: Real,

    /// U coordinate of the intersection.
    pub u: Real,

    /// V coordinate of the intersection.
    pub v: Real,
}

impl Intersection {
    /// Constructs an [`Intersection`].
    pub fn new(distance: Real, u: Real, v: Real) -> Intersection {
        Intersection { distance, u, v }
    }
}

impl Ray {
    /// Creates a new [`Ray`] from an `origin` and a `direction`.
    /// `direction` will be normalized and must not be zero. A zero direction normalizes
    /// to NaN components, and such a ray misses every box and triangle.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::ray::Ray;
    /// use meshbvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(2.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// assert_eq!(ray.origin, origin);
    /// assert_eq!(ray.direction, Vector3::new(1.0, 0.0, 0.0));
    /// ```
    ///
    /// [`Ray`]: struct.Ray.html
    ///
    pub fn new(origin: Point3, direction: Vector3) -> Ray {
        let direction = direction.normalize();
        Ray {
            origin,
            direction,
            inv_direction: inv_dir(&direction),
        }
    }

    /// Creates a [`Ray`] starting at `origin` and pointing at `target`.
    pub fn towards(origin: Point3, target: Point3) -> Ray {
        Ray::new(origin, target - origin)
    }

    /// Tests the intersection of a [`Ray`] with an [`Aabb`] using the slab method.
    /// Returns the entry distance if the box is hit in front of the origin and its entry
    /// lies closer than `best_t`.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::aabb::Aabb;
    /// use meshbvh::ray::Ray;
    /// use meshbvh::{Point3, Vector3};
    ///
    /// let origin = Point3::new(0.0, 0.0, 0.0);
    /// let direction = Vector3::new(1.0, 0.0, 0.0);
    /// let ray = Ray::new(origin, direction);
    ///
    /// let point1 = Point3::new(99.9, -1.0, -1.0);
    /// let point2 = Point3::new(100.1, 1.0, 1.0);
    /// let aabb = Aabb::with_bounds(point1, point2);
    ///
    /// let entry = ray.intersects_aabb(&aabb, 1e10).unwrap();
    /// assert!((entry - 99.9).abs() < 1e-4);
    /// assert!(ray.intersects_aabb(&aabb, 50.0).is_none());
    /// ```
    ///
    /// [`Ray`]: struct.Ray.html
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub fn intersects_aabb(&self, aabb: &Aabb, best_t: Real) -> Option<Real> {
        slab_test(&self.origin, &self.inv_direction, aabb, best_t)
    }

    /// Returns true if the ray hits `aabb` anywhere in front of its origin.
    pub fn hits_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects_aabb(aabb, Real::INFINITY).is_some()
    }

    /// Implementation of the
    /// [Möller-Trumbore triangle/ray intersection algorithm](https://en.wikipedia.org/wiki/M%C3%B6ller%E2%80%93Trumbore_intersection_algorithm).
    /// Returns the signed distance to the intersection, as well as
    /// the u and v coordinates of the intersection.
    /// Both faces count. Returns `None` if the ray is parallel to the triangle's plane or
    /// passes outside of the triangle. Hits behind the origin are returned with a negative
    /// distance.
    #[allow(clippy::many_single_char_names)]
    pub fn intersects_triangle(&self, a: &Point3, b: &Point3, c: &Point3) -> Option<Intersection> {
        let a_to_b = *b - *a;
        let a_to_c = *c - *a;

        // Begin calculating determinant - also used to calculate u parameter
        // u_vec lies in view plane
        // length of a_to_c in view_plane = |u_vec| = |a_to_c|*sin(a_to_c, dir)
        let u_vec = self.direction.cross(&a_to_c);

        // If determinant is near zero, ray lies in plane of triangle
        // The determinant corresponds to the parallelepiped volume:
        // det = 0 => [dir, a_to_b, a_to_c] not linearly independant
        let det = a_to_b.dot(&u_vec);

        // Both signs of the determinant are accepted, so there is no backface culling.
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;

        // Vector from point a to ray origin
        let a_to_origin = self.origin - *a;

        // Calculate u parameter
        let u = a_to_origin.dot(&u_vec) * inv_det;

        // Test bounds: u < 0 || u > 1 => outside of triangle
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        // Prepare to test v parameter
        let v_vec = a_to_origin.cross(&a_to_b);

        // Calculate v parameter and test bound
        let v = self.direction.dot(&v_vec) * inv_det;
        // The intersection lies outside of the triangle
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let distance = a_to_c.dot(&v_vec) * inv_det;
        Some(Intersection::new(distance, u, v))
    }

    /// Intersects the ray with a [`TriangleRecord`]. A hit carries the signed distance and
    /// the record's stored normal.
    pub fn hit_triangle(&self, triangle: &TriangleRecord) -> HitInfo {
        let [a, b, c] = &triangle.vertices;
        match self.intersects_triangle(a, b, c) {
            Some(intersection) => HitInfo::new(intersection.distance, triangle.normal),
            None => HitInfo::miss(),
        }
    }
}
