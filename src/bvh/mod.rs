//! This module defines a [`Bvh`], its [`BvhNode`]s and the traversal procedures.
//!
//! [`Bvh`]: struct.Bvh.html
//! [`BvhNode`]: struct.BvhNode.html
//!

mod bvh_impl;
mod bvh_node;
mod traverse;

pub use self::bvh_impl::*;
pub use self::bvh_node::*;
