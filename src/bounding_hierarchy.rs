//! This module defines the [`BoundingHierarchy`] trait.

use crate::config::BvhConfig;
use crate::error::MeshError;
use crate::hit::HitInfo;
use crate::mesh::Mesh;
use crate::ray::Ray;

/// This trait defines an acceleration structure with space partitioning.
/// This structure is used to efficiently compute closest ray-mesh intersections.
///
/// A renderer only needs this seam: build once from the mesh, then issue any number of
/// read-only queries, possibly from several threads at once.
pub trait BoundingHierarchy: Sized {
    /// Creates a new [`BoundingHierarchy`] from `mesh`.
    ///
    /// # Examples
    ///
    /// ```
    /// use meshbvh::bounding_hierarchy::BoundingHierarchy;
    /// use meshbvh::bvh::Bvh;
    /// use meshbvh::mesh::Mesh;
    ///
    /// let bvh = Bvh::build(&Mesh::default()).unwrap();
    /// assert_eq!(BoundingHierarchy::triangle_count(&bvh), 0);
    /// ```
    ///
    /// [`BoundingHierarchy`]: trait.BoundingHierarchy.html
    ///
    fn build(mesh: &Mesh, config: BvhConfig) -> Result<Self, MeshError>;

    /// Returns the closest hit of `ray` with positive distance, or a miss.
    fn closest_hit(&self, ray: &Ray) -> HitInfo;

    /// Returns the number of triangles referenced by the hierarchy.
    fn triangle_count(&self) -> usize;
}
