use crate::aabb::Aabb;

/// A node of a [`Bvh`], stored by value in the node arena.
///
/// The node bounds a contiguous range of the triangle index permutation. A node with a
/// positive `tri_count` is a leaf over `tri_indices[left_first .. left_first + tri_count]`.
/// A node with `tri_count == 0` is an inner node whose children are `left_first` and
/// `left_first + 1`, always appended next to each other.
///
/// [`Bvh`]: struct.Bvh.html
///
#[derive(Debug, Copy, Clone, PartialEq)]
#[repr(C)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BvhNode {
    /// Bounds of every triangle below this node.
    pub aabb: Aabb,

    /// First child index for inner nodes, first permutation offset for leaves.
    pub left_first: u32,

    /// Number of triangles in a leaf, `0` for inner nodes.
    pub tri_count: u32,
}

impl BvhNode {
    /// Creates a leaf over `tri_count` triangles starting at permutation offset `first`.
    /// Its bounds are left empty until the builder computes them.
    pub fn leaf(first: u32, tri_count: u32) -> BvhNode {
        BvhNode {
            aabb: Aabb::empty(),
            left_first: first,
            tri_count,
        }
    }

    /// Returns true if this node references triangles directly.
    pub fn is_leaf(&self) -> bool {
        self.tri_count > 0
    }

    /// Returns the index of the left child node.
    ///
    /// # Panics
    ///
    /// Panics if called on a leaf.
    pub fn child_l(&self) -> usize {
        assert!(!self.is_leaf(), "Tried to get the left child of a leaf node.");
        self.left_first as usize
    }

    /// Returns the index of the right child node.
    ///
    /// # Panics
    ///
    /// Panics if called on a leaf.
    pub fn child_r(&self) -> usize {
        assert!(!self.is_leaf(), "Tried to get the right child of a leaf node.");
        self.left_first as usize + 1
    }

    /// Returns the range of the index permutation covered by a leaf, or an empty range for
    /// inner nodes.
    pub fn triangle_range(&self) -> std::ops::Range<usize> {
        if self.is_leaf() {
            let first = self.left_first as usize;
            first..first + self.tri_count as usize
        } else {
            0..0
        }
    }
}
