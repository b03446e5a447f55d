//! This module exports methods to flatten the [`Bvh`] into a stackless layout and traverse
//! it iteratively.
//!
//! Every flat node stores an escape index: the node to continue with once its subtree has
//! been finished or skipped. A query then needs neither recursion nor a stack, which is the
//! layout compute shaders expect.
//!
//! [`Bvh`]: ../bvh/struct.Bvh.html

use crate::aabb::Aabb;
use crate::bounding_hierarchy::BoundingHierarchy;
use crate::bvh::Bvh;
use crate::config::BvhConfig;
use crate::error::MeshError;
use crate::hit::HitInfo;
use crate::mesh::Mesh;
use crate::ray::Ray;
use crate::triangle::TriangleRecord;

/// Escape index of the root. Reaching it ends a traversal.
pub const INVALID_NODE: u32 = u32::MAX;

/// A node of a [`FlatBvh`]. Indices are the same as in the [`Bvh`] node arena.
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
///
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatNode {
    /// Bounds of the subtree.
    pub aabb: Aabb,

    /// Left child for inner nodes, first triangle offset for leaves.
    pub left_first: u32,

    /// Number of triangles in a leaf, `0` for inner nodes.
    pub tri_count: u32,

    /// The node to jump to if the [`Aabb`] test fails or the leaf is done.
    /// [`INVALID_NODE`] ends the traversal.
    ///
    /// [`Aabb`]: ../aabb/struct.Aabb.html
    ///
    pub escape_index: u32,
}

/// A flattened [`Bvh`]. The triangles are stored in leaf order, so every leaf addresses
/// `triangles[left_first .. left_first + tri_count]` directly.
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatBvh {
    nodes: Vec<FlatNode>,
    triangles: Vec<TriangleRecord>,
}

/// Prints a textual representation of a flat [`Bvh`].
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
///
pub fn pretty_print_flat_bvh(flat_nodes: &[FlatNode]) {
    for (i, node) in flat_nodes.iter().enumerate() {
        println!(
            "{}\tleft_first {}\ttri_count {}\tescape {}",
            i, node.left_first, node.tri_count, node.escape_index
        );
    }
}

impl Bvh {
    /// Computes the escape index of every node. A left child escapes to its sibling, a right
    /// child to the escape of its parent, and the root to [`INVALID_NODE`].
    pub fn escape_indices(&self) -> Vec<u32> {
        let nodes = self.nodes();
        let mut escape = vec![INVALID_NODE; nodes.len()];
        if self.is_empty() {
            return escape;
        }

        // Children are always stored after their parent, so the parent's escape is known.
        for (node_index, node) in nodes.iter().enumerate() {
            if !node.is_leaf() {
                escape[node.child_l()] = node.child_r() as u32;
                escape[node.child_r()] = escape[node_index];
            }
        }
        escape
    }

    /// Flattens the [`Bvh`] so that it can be traversed iteratively.
    ///
    /// # Examples
    ///
    /// ```
    /// use meshbvh::bvh::Bvh;
    /// use meshbvh::flat_bvh::INVALID_NODE;
    /// use meshbvh::mesh::Mesh;
    /// use meshbvh::Vector4;
    ///
    /// let positions = vec![
    ///     Vector4::new(0.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(1.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(0.0, 1.0, 0.0, 1.0),
    /// ];
    /// let normals = vec![Vector4::new(0.0, 0.0, 1.0, 0.0); 3];
    /// let bvh = Bvh::build(&Mesh::new(positions, normals, vec![0, 1, 2])).unwrap();
    ///
    /// let flat_bvh = bvh.flatten();
    /// assert_eq!(flat_bvh.nodes().len(), 1);
    /// assert_eq!(flat_bvh.nodes()[0].escape_index, INVALID_NODE);
    /// ```
    ///
    /// [`Bvh`]: ../bvh/struct.Bvh.html
    ///
    pub fn flatten(&self) -> FlatBvh {
        let nodes = self.flatten_custom(&|aabb, left_first, tri_count, escape_index| FlatNode {
            aabb: *aabb,
            left_first,
            tri_count,
            escape_index,
        });
        let triangles = self
            .tri_indices()
            .iter()
            .map(|&index| self.triangles()[index as usize])
            .collect();
        FlatBvh { nodes, triangles }
    }

    /// Flattens the [`Bvh`] into custom nodes, for example a GPU buffer layout.
    /// The `constructor` receives the bounds, `left_first`, `tri_count` and escape index of
    /// every node in arena order.
    ///
    /// [`Bvh`]: ../bvh/struct.Bvh.html
    ///
    pub fn flatten_custom<F, FNodeType>(&self, constructor: &F) -> Vec<FNodeType>
    where
        F: Fn(&Aabb, u32, u32, u32) -> FNodeType,
    {
        self.nodes()
            .iter()
            .zip(self.escape_indices())
            .map(|(node, escape_index)| {
                constructor(&node.aabb, node.left_first, node.tri_count, escape_index)
            })
            .collect()
    }
}

impl FlatBvh {
    /// The flat nodes, root first.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// The triangle records in leaf order.
    pub fn triangles(&self) -> &[TriangleRecord] {
        &self.triangles
    }

    /// Returns the closest hit with positive distance of `ray`, walking the escape links
    /// without a stack.
    pub fn intersect(&self, ray: &Ray) -> HitInfo {
        let mut best = HitInfo::miss();
        if self.triangles.is_empty() {
            return best;
        }

        let mut index = 0;
        while index != INVALID_NODE {
            let node = &self.nodes[index as usize];
            if ray.intersects_aabb(&node.aabb, best.t).is_none() {
                index = node.escape_index;
            } else if node.tri_count > 0 {
                let first = node.left_first as usize;
                for triangle in &self.triangles[first..first + node.tri_count as usize] {
                    let hit = ray.hit_triangle(triangle);
                    if hit.t > 0.0 {
                        best = best.closer(hit);
                    }
                }
                index = node.escape_index;
            } else {
                index = node.left_first;
            }
        }
        best
    }
}

impl BoundingHierarchy for FlatBvh {
    fn build(mesh: &Mesh, config: BvhConfig) -> Result<FlatBvh, MeshError> {
        Ok(Bvh::build_with_config(mesh, config)?.flatten())
    }

    fn closest_hit(&self, ray: &Ray) -> HitInfo {
        self.intersect(ray)
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}
