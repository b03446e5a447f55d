//! Build parameters of a [`Bvh`].
//!
//! [`Bvh`]: ../bvh/struct.Bvh.html

use crate::Real;

/// Default recursion limit of the builder.
pub const DEFAULT_MAX_DEPTH: u32 = 100;

/// Default scale applied to the vertex sum of a triangle to obtain its split centroid.
pub const DEFAULT_CENTROID_WEIGHT: Real = 0.3;

/// Parameters controlling how a [`Bvh`] is built.
///
/// With the `serde` feature every field is optional when deserializing and falls back to
/// its default.
///
/// # Examples
/// ```
/// use meshbvh::config::BvhConfig;
///
/// let config = BvhConfig::default().with_max_depth(16).with_max_leaf_triangles(4);
/// assert_eq!(config.max_depth, 16);
/// assert_eq!(config.max_leaf_triangles, 4);
/// assert_eq!(config.centroid_weight, 0.3);
/// ```
///
/// [`Bvh`]: ../bvh/struct.Bvh.html
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BvhConfig {
    /// Nodes at this depth are not subdivided any further, regardless of their size.
    pub max_depth: u32,

    /// Nodes holding at most this many triangles are not subdivided.
    /// `1` subdivides until every split becomes degenerate.
    pub max_leaf_triangles: u32,

    /// Scale applied to the sum of a triangle's vertices to place the centroid used for
    /// partitioning. `0.3`, not `1/3`, by default.
    pub centroid_weight: Real,
}

impl BvhConfig {
    /// Returns this config with `max_depth` replaced.
    pub fn with_max_depth(mut self, max_depth: u32) -> BvhConfig {
        self.max_depth = max_depth;
        self
    }

    /// Returns this config with `max_leaf_triangles` replaced.
    pub fn with_max_leaf_triangles(mut self, max_leaf_triangles: u32) -> BvhConfig {
        self.max_leaf_triangles = max_leaf_triangles;
        self
    }

    /// Returns this config with `centroid_weight` replaced.
    pub fn with_centroid_weight(mut self, centroid_weight: Real) -> BvhConfig {
        self.centroid_weight = centroid_weight;
        self
    }
}

impl Default for BvhConfig {
    fn default() -> BvhConfig {
        BvhConfig {
            max_depth: DEFAULT_MAX_DEPTH,
            max_leaf_triangles: 1,
            centroid_weight: DEFAULT_CENTROID_WEIGHT,
        }
    }
}
