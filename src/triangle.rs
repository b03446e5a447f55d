//! This module defines [`TriangleRecord`], the per-triangle data stored in a [`Bvh`],
//! and the conversion from a raw [`Mesh`].
//!
//! [`Bvh`]: ../bvh/struct.Bvh.html

use crate::aabb::{Aabb, Bounded};
use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::{Point3, Real, Vector3, Vector4};

/// A triangle with the data needed to partition and intersect it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleRecord {
    /// The three corners, in mesh order.
    pub vertices: [Point3; 3],

    /// Point used to decide which side of a split the triangle falls on.
    /// It is the scaled vertex sum and not necessarily the geometric centroid.
    pub centroid: Point3,

    /// Normalized face normal reported for hits on this triangle.
    pub normal: Vector3,
}

impl TriangleRecord {
    /// Creates a triangle from its corners and a normal. The centroid is the mean of the
    /// corners, the normal is normalized (a zero normal stays zero).
    pub fn new(a: Point3, b: Point3, c: Point3, normal: Vector3) -> TriangleRecord {
        TriangleRecord {
            vertices: [a, b, c],
            centroid: Point3::from((a.coords + b.coords + c.coords) / 3.0),
            normal: normalize_or_zero(normal),
        }
    }

    /// Converts every index triple of `mesh` into a [`TriangleRecord`], in order.
    ///
    /// The centroid is the sum of the three vertices scaled by `centroid_weight`. The normal
    /// is the stored normal of the first vertex, normalized, not recomputed from the face.
    ///
    /// # Examples
    /// ```
    /// use meshbvh::mesh::Mesh;
    /// use meshbvh::triangle::TriangleRecord;
    /// use meshbvh::{Point3, Vector3, Vector4};
    ///
    /// let positions = vec![
    ///     Vector4::new(0.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(3.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(0.0, 3.0, 0.0, 1.0),
    /// ];
    /// let normals = vec![Vector4::new(0.0, 0.0, 2.0, 0.0); 3];
    /// let mesh = Mesh::new(positions, normals, vec![0, 1, 2]);
    ///
    /// let triangles = TriangleRecord::from_mesh(&mesh, 0.5).unwrap();
    /// assert_eq!(triangles.len(), 1);
    /// assert_eq!(triangles[0].centroid, Point3::new(1.5, 1.5, 0.0));
    /// assert_eq!(triangles[0].normal, Vector3::new(0.0, 0.0, 1.0));
    /// ```
    pub fn from_mesh(mesh: &Mesh, centroid_weight: Real) -> Result<Vec<TriangleRecord>, MeshError> {
        mesh.validate()?;

        let triangles = mesh
            .indices
            .chunks_exact(3)
            .map(|face| {
                let [a, b, c] = [face[0], face[1], face[2]].map(|i| mesh.positions[i as usize]);
                let vertices = [to_point(&a), to_point(&b), to_point(&c)];
                let sum = vertices[0].coords + vertices[1].coords + vertices[2].coords;
                TriangleRecord {
                    vertices,
                    centroid: Point3::from(sum * centroid_weight),
                    normal: normalize_or_zero(mesh.normals[face[0] as usize].xyz()),
                }
            })
            .collect();

        Ok(triangles)
    }
}

impl Bounded for TriangleRecord {
    fn aabb(&self) -> Aabb {
        Aabb::empty()
            .grow(&self.vertices[0])
            .grow(&self.vertices[1])
            .grow(&self.vertices[2])
    }
}

fn to_point(v: &Vector4) -> Point3 {
    Point3::new(v.x, v.y, v.z)
}

fn normalize_or_zero(v: Vector3) -> Vector3 {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}
