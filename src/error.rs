//! Errors reported when mesh input violates the builder's preconditions.

use thiserror::Error;

/// Malformed mesh input. Degenerate geometry is never reported here: zero-area triangles,
/// coincident centroids and parallel rays are ordinary cases handled by the builder and
/// the intersection tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// The flat index array does not describe whole triangles.
    #[error("index count {count} is not a multiple of 3")]
    IndexCountNotMultipleOfThree {
        /// Length of the index array.
        count: usize,
    },

    /// Positions and normals are indexed together and must have the same length.
    #[error("mesh has {positions} vertex positions but {normals} vertex normals")]
    NormalCountMismatch {
        /// Number of vertex positions.
        positions: usize,
        /// Number of vertex normals.
        normals: usize,
    },

    /// A triangle refers to a vertex that does not exist.
    #[error("triangle {triangle} refers to vertex {index}, but the mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        /// Index of the offending triangle.
        triangle: usize,
        /// The out-of-range vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Node ranges are stored as `u32`, which bounds the number of triangles.
    #[error("mesh has {count} triangles, more than the {max} a BVH can reference")]
    TooManyTriangles {
        /// Number of triangles in the mesh.
        count: usize,
        /// Largest supported triangle count.
        max: usize,
    },
}
