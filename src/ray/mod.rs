//! This module holds the [`Ray`] definition and the primitive intersection tests used by
//! traversal: the slab test against [`Aabb`]s and the Möller–Trumbore test against triangles.
//!
//! [`Aabb`]: ../aabb/struct.Aabb.html
mod intersect_default;
mod ray_impl;

pub use self::intersect_default::*;
pub use self::ray_impl::*;
