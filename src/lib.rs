//! A crate which builds a binary bounding volume hierarchy over a static triangle mesh and
//! answers closest-hit ray queries against it.
//!
//! ## About
//!
//! Testing a ray against every triangle of a mesh costs O(n). A BVH reduces this to roughly
//! O(log2(n)) at the cost of building the tree once in advance. The tree is built with a
//! spatial median split: every node is cut in half along the longest axis of its bounding box
//! and its triangles are partitioned by their centroids. Queries walk the tree from the root,
//! skip every subtree whose box the ray misses or whose entry lies behind the best hit found
//! so far, and resolve the closest triangle hit in the leaves.
//!
//! Nodes live in a flat arena and refer to each other by index, and the triangles are
//! referenced through an index permutation, so the whole structure can be flattened into a
//! stackless layout (see [`flat_bvh`]) suitable for GPU upload.
//!
//! ## Example
//!
//! ```
//! use meshbvh::bvh::Bvh;
//! use meshbvh::mesh::Mesh;
//! use meshbvh::ray::Ray;
//! use meshbvh::{Point3, Vector3, Vector4};
//!
//! // A single triangle in the z = 0 plane, facing +z.
//! let positions = vec![
//!     Vector4::new(-1.0, -1.0, 0.0, 1.0),
//!     Vector4::new(1.0, -1.0, 0.0, 1.0),
//!     Vector4::new(0.0, 1.0, 0.0, 1.0),
//! ];
//! let normals = vec![Vector4::new(0.0, 0.0, 1.0, 0.0); 3];
//! let mesh = Mesh::new(positions, normals, vec![0, 1, 2]);
//!
//! let bvh = Bvh::build(&mesh).unwrap();
//! let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
//! let hit = bvh.intersect_ray(&ray);
//!
//! assert!(hit.is_hit);
//! assert!((hit.t - 5.0).abs() < 1e-5);
//! assert_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0));
//! ```
//!
//! ## Features
//!
//! - `rayon` (default **enabled**) - answers batches of rays in parallel in [`bvh::Bvh::intersect_rays`]
//! - `serde` (default **disabled**) - adds `Serialize` and `Deserialize` implementations for the
//!   tree, its nodes, triangles and the build configuration
//!

/// Point math type used by this crate. Type alias for [`nalgebra::Point3<f32>`].
pub type Point3 = nalgebra::Point3<f32>;

/// Vector math type used by this crate. Type alias for [`nalgebra::Vector3<f32>`].
pub type Vector3 = nalgebra::Vector3<f32>;

/// Homogeneous vector type used for mesh input. Type alias for [`nalgebra::Vector4<f32>`].
pub type Vector4 = nalgebra::Vector4<f32>;

/// Float type used by this crate
pub type Real = f32;

pub mod aabb;
pub mod axis;
pub mod bounding_hierarchy;
pub mod bvh;
pub mod config;
pub mod error;
pub mod flat_bvh;
pub mod hit;
pub mod mesh;
pub mod ray;
pub mod triangle;
mod utils;

#[cfg(test)]
mod testbase;

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
