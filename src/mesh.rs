//! This module defines [`Mesh`], the raw triangle geometry a [`Bvh`] is built from.
//!
//! [`Bvh`]: ../bvh/struct.Bvh.html

use log::warn;

use crate::error::MeshError;
use crate::Vector4;

/// Largest number of triangles a [`Bvh`] can reference. Node and permutation indices are
/// stored as `u32` and a tree over `n` triangles has up to `2n - 1` nodes.
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
pub const MAX_TRIANGLES: usize = (u32::MAX / 2) as usize;

/// An indexed triangle mesh as supplied by the geometry loader.
///
/// Positions are homogeneous, their `w` component is ignored. Normals share the indexing
/// of the positions. Every consecutive triple of `indices` forms one triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vector4>,

    /// Per-vertex normals, indexed like `positions`.
    pub normals: Vec<Vector4>,

    /// Flat triangle index array.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Creates a [`Mesh`] from its vertex and index arrays without checking them.
    /// See [`Mesh::validate`].
    pub fn new(positions: Vec<Vector4>, normals: Vec<Vector4>, indices: Vec<u32>) -> Mesh {
        Mesh {
            positions,
            normals,
            indices,
        }
    }

    /// Returns the number of whole triangles described by `indices`.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks that the mesh can be turned into triangles: the index array holds whole
    /// triangles, positions and normals line up, every index refers to an existing vertex,
    /// and the triangle count stays within [`MAX_TRIANGLES`].
    pub fn validate(&self) -> Result<(), MeshError> {
        let result = self.check();
        if let Err(ref err) = result {
            warn!("rejecting mesh: {}", err);
        }
        result
    }

    fn check(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IndexCountNotMultipleOfThree {
                count: self.indices.len(),
            });
        }

        if self.positions.len() != self.normals.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: self.positions.len(),
                normals: self.normals.len(),
            });
        }

        if self.triangle_count() > MAX_TRIANGLES {
            return Err(MeshError::TooManyTriangles {
                count: self.triangle_count(),
                max: MAX_TRIANGLES,
            });
        }

        let vertex_count = self.positions.len();
        for (triangle, face) in self.indices.chunks_exact(3).enumerate() {
            if let Some(&index) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(MeshError::VertexIndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}
