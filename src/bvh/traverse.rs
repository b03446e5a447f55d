use crate::bvh::Bvh;
use crate::hit::HitInfo;
use crate::ray::Ray;
use crate::Real;

/// Entries held inline before the traversal stack spills to the heap. A traversal needs at
/// most one entry per level plus one.
const INLINE_STACK_SIZE: usize = 64;

/// LIFO stack of `(node index, entry distance)` pairs which only allocates for trees
/// deeper than [`INLINE_STACK_SIZE`].
struct TraversalStack {
    inline: [(usize, Real); INLINE_STACK_SIZE],
    len: usize,
    spill: Vec<(usize, Real)>,
}

impl TraversalStack {
    fn new() -> TraversalStack {
        TraversalStack {
            inline: [(0, 0.0); INLINE_STACK_SIZE],
            len: 0,
            spill: Vec::new(),
        }
    }

    fn push(&mut self, entry: (usize, Real)) {
        if self.len < INLINE_STACK_SIZE {
            self.inline[self.len] = entry;
            self.len += 1;
        } else {
            self.spill.push(entry);
        }
    }

    fn pop(&mut self) -> Option<(usize, Real)> {
        // The spill only fills while the inline part is full.
        if let Some(entry) = self.spill.pop() {
            return Some(entry);
        }
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.inline[self.len])
    }
}

impl Bvh {
    /// Returns the same closest hit as [`Bvh::intersect_ray`], visiting the nearer child of
    /// every inner node first so that the best hit shrinks early and more far subtrees are
    /// skipped. Uses an explicit stack instead of recursion, kept on the call stack unless
    /// the tree is deeper than 63 levels.
    ///
    /// # Examples
    ///
    /// ```
    /// use meshbvh::bvh::Bvh;
    /// use meshbvh::mesh::Mesh;
    /// use meshbvh::ray::Ray;
    /// use meshbvh::{Point3, Vector4};
    ///
    /// let positions = vec![
    ///     Vector4::new(-1.0, -1.0, 2.0, 1.0),
    ///     Vector4::new(1.0, -1.0, 2.0, 1.0),
    ///     Vector4::new(0.0, 1.0, 2.0, 1.0),
    /// ];
    /// let normals = vec![Vector4::new(0.0, 0.0, -1.0, 0.0); 3];
    /// let bvh = Bvh::build(&Mesh::new(positions, normals, vec![0, 1, 2])).unwrap();
    ///
    /// let ray = Ray::towards(Point3::origin(), Point3::new(0.0, 0.0, 1.0));
    /// let hit = bvh.intersect_ordered(&ray);
    /// assert!((hit.t - 2.0).abs() < 1e-5);
    /// ```
    pub fn intersect_ordered(&self, ray: &Ray) -> HitInfo {
        let mut best = HitInfo::miss();
        if self.is_empty() {
            return best;
        }

        let nodes = self.nodes();
        let entry = match ray.intersects_aabb(&nodes[0].aabb, best.t) {
            Some(entry) => entry,
            None => return best,
        };

        let mut stack = TraversalStack::new();
        stack.push((0, entry));
        while let Some((node_index, entry)) = stack.pop() {
            // The best hit may have moved closer since this node was pushed.
            if entry >= best.t {
                continue;
            }

            let node = &nodes[node_index];
            if node.is_leaf() {
                for &index in &self.tri_indices()[node.triangle_range()] {
                    let hit = ray.hit_triangle(&self.triangles()[index as usize]);
                    if hit.t > 0.0 {
                        best = best.closer(hit);
                    }
                }
                continue;
            }

            let child_l = node.child_l();
            let child_r = node.child_r();
            let entry_l = ray.intersects_aabb(&nodes[child_l].aabb, best.t);
            let entry_r = ray.intersects_aabb(&nodes[child_r].aabb, best.t);
            match (entry_l, entry_r) {
                (Some(l), Some(r)) => {
                    if l <= r {
                        stack.push((child_r, r));
                        stack.push((child_l, l));
                    } else {
                        stack.push((child_l, l));
                        stack.push((child_r, r));
                    }
                }
                (Some(l), None) => stack.push((child_l, l)),
                (None, Some(r)) => stack.push((child_r, r)),
                (None, None) => {}
            }
        }
        best
    }
}
