//! This module defines the [`Bvh`] building procedure and its recursive closest-hit query.
//!
//! [`Bvh`]: struct.Bvh.html
//!

use log::{debug, trace};

use crate::aabb::{Aabb, Bounded};
use crate::axis::Axis;
use crate::bounding_hierarchy::BoundingHierarchy;
use crate::bvh::BvhNode;
use crate::config::BvhConfig;
use crate::error::MeshError;
use crate::hit::HitInfo;
use crate::mesh::{Mesh, MAX_TRIANGLES};
use crate::ray::Ray;
use crate::triangle::TriangleRecord;
use crate::Real;

/// Summary of the shape of a built [`Bvh`].
///
/// [`Bvh`]: struct.Bvh.html
///
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BvhStats {
    /// Total number of nodes in the arena.
    pub node_count: usize,

    /// Number of leaves.
    pub leaf_count: usize,

    /// Depth of the deepest leaf. The root has depth `0`.
    pub max_depth: u32,

    /// Number of triangles in the largest leaf.
    pub max_leaf_triangles: u32,
}

/// The [`Bvh`] data structure. Contains the node arena, the per-triangle records and the
/// permutation through which leaves address them.
///
/// The structure is immutable once built. Any number of threads may query it at once.
///
/// [`Bvh`]: struct.Bvh.html
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangles: Vec<TriangleRecord>,
    tri_indices: Vec<u32>,
    config: BvhConfig,
}

impl Bvh {
    /// Creates a new [`Bvh`] from `mesh` with the default [`BvhConfig`].
    ///
    /// # Examples
    ///
    /// ```
    /// use meshbvh::bvh::Bvh;
    /// use meshbvh::mesh::Mesh;
    /// use meshbvh::Vector4;
    ///
    /// let positions = vec![
    ///     Vector4::new(0.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(1.0, 0.0, 0.0, 1.0),
    ///     Vector4::new(0.0, 1.0, 0.0, 1.0),
    /// ];
    /// let normals = vec![Vector4::new(0.0, 0.0, 1.0, 0.0); 3];
    /// let mesh = Mesh::new(positions, normals, vec![0, 1, 2]);
    ///
    /// let bvh = Bvh::build(&mesh).unwrap();
    /// assert_eq!(bvh.nodes().len(), 1);
    /// assert!(bvh.nodes()[0].is_leaf());
    /// ```
    ///
    /// [`Bvh`]: struct.Bvh.html
    /// [`BvhConfig`]: ../config/struct.BvhConfig.html
    ///
    pub fn build(mesh: &Mesh) -> Result<Bvh, MeshError> {
        Bvh::build_with_config(mesh, BvhConfig::default())
    }

    /// Creates a new [`Bvh`] from `mesh` using the build parameters in `config`.
    /// Fails without building anything if the mesh is malformed.
    ///
    /// [`Bvh`]: struct.Bvh.html
    ///
    pub fn build_with_config(mesh: &Mesh, config: BvhConfig) -> Result<Bvh, MeshError> {
        let triangles = TriangleRecord::from_mesh(mesh, config.centroid_weight)?;
        Bvh::from_triangles(triangles, config)
    }

    /// Creates a new [`Bvh`] over already prepared triangle records.
    ///
    /// [`Bvh`]: struct.Bvh.html
    ///
    pub fn from_triangles(
        triangles: Vec<TriangleRecord>,
        config: BvhConfig,
    ) -> Result<Bvh, MeshError> {
        if triangles.len() > MAX_TRIANGLES {
            return Err(MeshError::TooManyTriangles {
                count: triangles.len(),
                max: MAX_TRIANGLES,
            });
        }

        let count = triangles.len() as u32;
        let mut bvh = Bvh {
            nodes: Vec::with_capacity((2 * triangles.len()).max(1)),
            tri_indices: (0..count).collect(),
            triangles,
            config,
        };

        bvh.nodes.push(BvhNode::leaf(0, count));
        bvh.update_node_bounds(0);
        bvh.subdivide(0, 0);

        let stats = bvh.stats();
        debug!(
            "built BVH over {} triangles: {} nodes, {} leaves, depth {}, largest leaf {}",
            count, stats.node_count, stats.leaf_count, stats.max_depth, stats.max_leaf_triangles
        );
        Ok(bvh)
    }

    /// Recomputes the bounds of a leaf from the vertices of the triangles it covers.
    fn update_node_bounds(&mut self, node_index: usize) {
        let range = self.nodes[node_index].triangle_range();
        let aabb = self.tri_indices[range]
            .iter()
            .fold(Aabb::empty(), |aabb, &index| {
                aabb.join(&self.triangles[index as usize].aabb())
            });
        self.nodes[node_index].aabb = aabb;
    }

    /// Splits the leaf at `node_index` at the spatial median of its longest axis and
    /// recurses into both halves. The node stays a leaf when the depth limit is reached,
    /// when it is small enough, or when all of its centroids fall on one side.
    fn subdivide(&mut self, node_index: usize, depth: u32) {
        let node = self.nodes[node_index];
        if node.tri_count <= self.config.max_leaf_triangles {
            return;
        }
        if depth >= self.config.max_depth {
            trace!(
                "node {} reached the depth limit {} with {} triangles",
                node_index,
                depth,
                node.tri_count
            );
            return;
        }

        let axis = node.aabb.largest_axis();
        let split_pos = node.aabb.min[axis] + node.aabb.size()[axis] * 0.5;

        let first = node.left_first as usize;
        let count = node.tri_count as usize;
        let left_count = self.partition(first, count, axis, split_pos);
        if left_count == 0 || left_count == count {
            trace!(
                "node {} with {} triangles cannot be split along {}",
                node_index,
                count,
                axis
            );
            return;
        }

        let child_l_index = self.nodes.len();
        self.nodes.push(BvhNode::leaf(node.left_first, left_count as u32));
        self.nodes.push(BvhNode::leaf(
            (first + left_count) as u32,
            (count - left_count) as u32,
        ));
        self.nodes[node_index].left_first = child_l_index as u32;
        self.nodes[node_index].tri_count = 0;

        self.update_node_bounds(child_l_index);
        self.update_node_bounds(child_l_index + 1);
        self.subdivide(child_l_index, depth + 1);
        self.subdivide(child_l_index + 1, depth + 1);
    }

    /// Reorders `tri_indices[first .. first + count]` so that triangles whose centroid lies
    /// below `split_pos` on `axis` come first. Returns how many of them there are.
    fn partition(&mut self, first: usize, count: usize, axis: Axis, split_pos: Real) -> usize {
        let mut i = first;
        let mut j = first + count;
        while i < j {
            let centroid = self.triangles[self.tri_indices[i] as usize].centroid;
            if centroid[axis] < split_pos {
                i += 1;
            } else {
                j -= 1;
                self.tri_indices.swap(i, j);
            }
        }
        i - first
    }

    /// The node arena. The root is at index `0`.
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// The triangle records in mesh order.
    pub fn triangles(&self) -> &[TriangleRecord] {
        &self.triangles
    }

    /// The permutation of triangle indices through which leaves address `triangles`.
    pub fn tri_indices(&self) -> &[u32] {
        &self.tri_indices
    }

    /// The parameters this tree was built with.
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Returns true if the tree holds no triangles. Its root is then an empty leaf.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the closest hit with positive distance of `ray` with the triangles below the
    /// node at `node_index`. Subtrees whose box the ray misses, or enters no closer than the
    /// best hit found so far, are skipped.
    ///
    /// # Panics
    ///
    /// Panics if `node_index` is not a node of this tree.
    ///
    pub fn intersect(&self, ray: &Ray, node_index: usize) -> HitInfo {
        let mut best = HitInfo::miss();
        if !self.is_empty() {
            self.intersect_node(ray, node_index, &mut best);
        }
        best
    }

    fn intersect_node(&self, ray: &Ray, node_index: usize, best: &mut HitInfo) {
        let node = &self.nodes[node_index];
        if ray.intersects_aabb(&node.aabb, best.t).is_none() {
            return;
        }

        if node.is_leaf() {
            for &index in &self.tri_indices[node.triangle_range()] {
                let hit = ray.hit_triangle(&self.triangles[index as usize]);
                if hit.t > 0.0 {
                    *best = best.closer(hit);
                }
            }
        } else {
            self.intersect_node(ray, node.child_l(), best);
            self.intersect_node(ray, node.child_r(), best);
        }
    }

    /// Returns the closest hit with positive distance of `ray` with the whole mesh.
    ///
    /// # Examples
    ///
    /// ```
    /// use meshbvh::bvh::Bvh;
    /// use meshbvh::mesh::Mesh;
    /// use meshbvh::ray::Ray;
    /// use meshbvh::{Point3, Vector3};
    ///
    /// let bvh = Bvh::build(&Mesh::default()).unwrap();
    /// let ray = Ray::new(Point3::origin(), Vector3::z());
    /// assert!(!bvh.intersect_ray(&ray).is_hit);
    /// ```
    pub fn intersect_ray(&self, ray: &Ray) -> HitInfo {
        self.intersect(ray, 0)
    }

    /// Tests `ray` against every triangle without using the tree.
    /// Returns the same closest hit as [`Bvh::intersect_ray`].
    pub fn intersect_all_primitives(&self, ray: &Ray) -> HitInfo {
        self.triangles
            .iter()
            .map(|triangle| ray.hit_triangle(triangle))
            .filter(|hit| hit.t > 0.0)
            .fold(HitInfo::miss(), HitInfo::closer)
    }

    /// Answers a batch of closest-hit queries, one result per ray in input order.
    #[cfg(feature = "rayon")]
    pub fn intersect_rays(&self, rays: &[Ray]) -> Vec<HitInfo> {
        use rayon::prelude::*;
        rays.par_iter().map(|ray| self.intersect_ordered(ray)).collect()
    }

    /// Answers a batch of closest-hit queries, one result per ray in input order.
    #[cfg(not(feature = "rayon"))]
    pub fn intersect_rays(&self, rays: &[Ray]) -> Vec<HitInfo> {
        rays.iter().map(|ray| self.intersect_ordered(ray)).collect()
    }

    /// Collects node, leaf and depth counts of the tree.
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            node_count: self.nodes.len(),
            leaf_count: 0,
            max_depth: 0,
            max_leaf_triangles: 0,
        };
        let mut stack = vec![(0usize, 0u32)];
        while let Some((node_index, depth)) = stack.pop() {
            let node = &self.nodes[node_index];
            if node.is_leaf() || self.is_empty() {
                stats.leaf_count += 1;
                stats.max_depth = stats.max_depth.max(depth);
                stats.max_leaf_triangles = stats.max_leaf_triangles.max(node.tri_count);
            } else {
                stack.push((node.child_r(), depth + 1));
                stack.push((node.child_l(), depth + 1));
            }
        }
        stats
    }

    /// Prints the [`Bvh`] in a tree-like visualization.
    ///
    /// [`Bvh`]: struct.Bvh.html
    ///
    pub fn pretty_print(&self) {
        self.print_node(0, 0);
    }

    fn print_node(&self, node_index: usize, depth: usize) {
        let node = &self.nodes[node_index];
        let padding = " ".repeat(depth);
        if node.is_leaf() || self.is_empty() {
            println!(
                "{}leaf={} aabb={} triangles={:?}",
                padding,
                node_index,
                node.aabb,
                &self.tri_indices[node.triangle_range()]
            );
        } else {
            println!("{}node={} aabb={}", padding, node_index, node.aabb);
            self.print_node(node.child_l(), depth + 1);
            self.print_node(node.child_r(), depth + 1);
        }
    }

    /// Asserts the structural invariants of the tree: every triangle is referenced by
    /// exactly one leaf, leaves cover contiguous ranges of the permutation in tree order,
    /// children are nested inside their parents, leaf boxes contain their triangles, no
    /// node is detached, and no leaf lies deeper than the configured depth limit.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant.
    ///
    pub fn assert_consistent(&self) {
        assert!(!self.nodes.is_empty(), "The tree has no root node.");

        let mut sorted = self.tri_indices.clone();
        sorted.sort_unstable();
        assert!(
            sorted.iter().copied().eq(0..self.triangles.len() as u32),
            "The triangle index permutation is not a permutation."
        );

        if self.is_empty() {
            assert_eq!(self.nodes.len(), 1, "An empty tree has more than a root.");
            assert_eq!(self.nodes[0].tri_count, 0);
            return;
        }

        let space = Aabb::with_bounds(
            crate::Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY),
            crate::Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY),
        );
        let mut node_count = 0;
        let covered = self.assert_consistent_subtree(0, 0, &space, 0, &mut node_count);

        assert_eq!(
            covered,
            self.triangles.len(),
            "The leaves do not cover every triangle."
        );
        assert_eq!(
            node_count,
            self.nodes.len(),
            "The tree contains detached nodes."
        );
    }

    /// Checks the subtree at `node_index`, which must start at permutation offset `first`.
    /// Returns the number of triangles it covers.
    fn assert_consistent_subtree(
        &self,
        node_index: usize,
        first: usize,
        outer_aabb: &Aabb,
        depth: u32,
        node_count: &mut usize,
    ) -> usize {
        assert!(
            node_index < self.nodes.len(),
            "Node index {} is out of bounds.",
            node_index
        );
        *node_count += 1;

        let node = &self.nodes[node_index];
        assert!(
            outer_aabb.contains(&node.aabb.min) && outer_aabb.contains(&node.aabb.max),
            "Node {} with {} is not contained in its parent {}.",
            node_index,
            node.aabb,
            outer_aabb
        );

        if node.is_leaf() {
            assert!(
                depth <= self.config.max_depth,
                "Leaf {} lies at depth {}.",
                node_index,
                depth
            );
            assert_eq!(
                node.left_first as usize, first,
                "Leaf {} does not continue the permutation range.",
                node_index
            );
            assert!(node.triangle_range().end <= self.tri_indices.len());
            for &index in &self.tri_indices[node.triangle_range()] {
                for vertex in &self.triangles[index as usize].vertices {
                    assert!(
                        node.aabb.contains(vertex),
                        "Leaf {} with {} does not contain vertex {} of triangle {}.",
                        node_index,
                        node.aabb,
                        vertex,
                        index
                    );
                }
            }
            node.tri_count as usize
        } else {
            let child_l = node.child_l();
            assert!(
                child_l > node_index && node.child_r() < self.nodes.len(),
                "Children of node {} are out of order or out of bounds.",
                node_index
            );
            let left = self.assert_consistent_subtree(child_l, first, &node.aabb, depth + 1, node_count);
            let right = self.assert_consistent_subtree(
                node.child_r(),
                first + left,
                &node.aabb,
                depth + 1,
                node_count,
            );
            left + right
        }
    }

    /// Asserts that every node box is exactly the bounds of the triangles below it.
    ///
    /// # Panics
    ///
    /// Panics if a box is larger or smaller than its contents.
    ///
    pub fn assert_tight(&self) {
        if !self.is_empty() {
            self.assert_tight_subtree(0);
        }
    }

    fn assert_tight_subtree(&self, node_index: usize) -> Aabb {
        let node = &self.nodes[node_index];
        let real_aabb = if node.is_leaf() {
            self.tri_indices[node.triangle_range()]
                .iter()
                .fold(Aabb::empty(), |aabb, &index| {
                    aabb.join(&self.triangles[index as usize].aabb())
                })
        } else {
            let child_l_aabb = self.assert_tight_subtree(node.child_l());
            let child_r_aabb = self.assert_tight_subtree(node.child_r());
            child_l_aabb.join(&child_r_aabb)
        };
        assert_eq!(
            real_aabb, node.aabb,
            "Node {} stores {} but bounds {}.",
            node_index, node.aabb, real_aabb
        );
        real_aabb
    }
}

impl BoundingHierarchy for Bvh {
    fn build(mesh: &Mesh, config: BvhConfig) -> Result<Bvh, MeshError> {
        Bvh::build_with_config(mesh, config)
    }

    fn closest_hit(&self, ray: &Ray) -> HitInfo {
        self.intersect_ray(ray)
    }

    fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}
