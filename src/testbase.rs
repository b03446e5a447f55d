//! Common utilities shared by unit tests.
#![cfg(test)]

use std::io::BufReader;

use obj::{load_obj, Obj, Vertex};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bounding_hierarchy::BoundingHierarchy;
use crate::bvh::Bvh;
use crate::config::BvhConfig;
use crate::hit::HitInfo;
use crate::mesh::Mesh;
use crate::ray::Ray;
use crate::{Point3, Vector3, Vector4};

/// A vector represented as a tuple
pub type TupleVec = (f32, f32, f32);

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10e10 to 10e10
/// A small enough range to prevent most fp32 errors from breaking certain tests
/// Tests which rely on this strategy should probably be rewritten
pub fn tuplevec_small_strategy() -> impl Strategy<Value = TupleVec> {
    (
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
        -10e10_f32..10e10_f32,
    )
}

/// Generate a `TupleVec` for [`proptest::strategy::Strategy`] from -10 to 10.
/// Used where computed distances are compared against a fixed tolerance.
pub fn tuplevec_unit_strategy() -> impl Strategy<Value = TupleVec> {
    (-10_f32..10_f32, -10_f32..10_f32, -10_f32..10_f32)
}

/// Convert a `TupleVec` to a [`Point3`].
pub fn tuple_to_point(tpl: &TupleVec) -> Point3 {
    Point3::new(tpl.0, tpl.1, tpl.2)
}

/// A unit cube centered on the origin, triangulated, with one normal per face.
pub const CUBE_OBJ: &str = "\
o cube
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
vn 0 0 -1
vn 0 0 1
vn -1 0 0
vn 1 0 0
vn 0 -1 0
vn 0 1 0
f 1//1 4//1 3//1
f 1//1 3//1 2//1
f 5//2 6//2 7//2
f 5//2 7//2 8//2
f 1//3 5//3 8//3
f 1//3 8//3 4//3
f 2//4 3//4 7//4
f 2//4 7//4 6//4
f 1//5 2//5 6//5
f 1//5 6//5 5//5
f 4//6 8//6 7//6
f 4//6 7//6 3//6
";

/// Parses a triangulated OBJ document with normals into a [`Mesh`].
pub fn load_obj_mesh(source: &str) -> Mesh {
    let obj: Obj<Vertex, u32> =
        load_obj(BufReader::new(source.as_bytes())).expect("Failed to decode .obj data.");

    let positions = obj
        .vertices
        .iter()
        .map(|v| Vector4::new(v.position[0], v.position[1], v.position[2], 1.0))
        .collect();
    let normals = obj
        .vertices
        .iter()
        .map(|v| Vector4::new(v.normal[0], v.normal[1], v.normal[2], 0.0))
        .collect();

    Mesh::new(positions, normals, obj.indices)
}

/// Appends an axis-aligned cube with half extent `half` centered at `center` to `mesh`.
/// Every face gets its own four vertices carrying the face normal. Both triangles of a
/// face start at the face's most positive corner.
pub fn push_cube(center: Point3, half: f32, mesh: &mut Mesh) {
    for axis in 0..3 {
        for sign in [1.0f32, -1.0] {
            let mut normal = Vector3::zeros();
            normal[axis] = sign;
            let mut tangent_u = Vector3::zeros();
            tangent_u[(axis + 1) % 3] = 1.0;
            let mut tangent_v = Vector3::zeros();
            tangent_v[(axis + 2) % 3] = 1.0;

            let face_center = center + normal * half;
            let base = mesh.positions.len() as u32;
            for (su, sv) in [(1.0f32, 1.0f32), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
                let p = face_center + (tangent_u * su + tangent_v * sv) * half;
                mesh.positions.push(Vector4::new(p.x, p.y, p.z, 1.0));
                mesh.normals.push(Vector4::new(normal.x, normal.y, normal.z, 0.0));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
}

/// The unit cube centered at the origin: 12 triangles with axis-aligned face normals.
pub fn unit_cube_mesh() -> Mesh {
    let mut mesh = Mesh::default();
    push_cube(Point3::origin(), 0.5, &mut mesh);
    mesh
}

/// Creates `n` deterministic random unit cubes inside `[-extent, extent]³`.
pub fn create_n_cubes(n: usize, extent: f32, seed: u64) -> Mesh {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mesh = Mesh::default();
    for _ in 0..n {
        let center = Point3::new(
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
        );
        push_cube(center, 0.5, &mut mesh);
    }
    mesh
}

/// Creates `n` deterministic random triangles with corners at most 1 away from a center
/// inside `[-extent, extent]³`. Each triangle has its own vertices carrying its face normal.
pub fn random_triangle_mesh(n: usize, extent: f32, seed: u64) -> Mesh {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut mesh = Mesh::default();
    for i in 0..n as u32 {
        let center = Vector3::new(
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
        );
        let corners: Vec<Vector3> = (0..3)
            .map(|_| {
                center
                    + Vector3::new(
                        rng.random_range(-1.0f32..=1.0),
                        rng.random_range(-1.0f32..=1.0),
                        rng.random_range(-1.0f32..=1.0),
                    )
            })
            .collect();
        let normal = (corners[1] - corners[0]).cross(&(corners[2] - corners[0]));
        for corner in &corners {
            mesh.positions
                .push(Vector4::new(corner.x, corner.y, corner.z, 1.0));
            mesh.normals
                .push(Vector4::new(normal.x, normal.y, normal.z, 0.0));
        }
        mesh.indices.extend_from_slice(&[3 * i, 3 * i + 1, 3 * i + 2]);
    }
    mesh
}

/// Generates deterministic rays for equivalence tests. Even rays aim at the interior of a
/// random triangle of `mesh`, odd rays point in a random direction. Origins lie inside
/// `[-extent, extent]³`.
pub fn random_rays(mesh: &Mesh, n: usize, extent: f32, seed: u64) -> Vec<Ray> {
    random_rays_around(mesh, n, Point3::origin(), extent, seed)
}

/// Like [`random_rays`], with origins inside the cube of half extent `extent` around
/// `center`.
pub fn random_rays_around(
    mesh: &Mesh,
    n: usize,
    center: Point3,
    extent: f32,
    seed: u64,
) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rays = Vec::with_capacity(n);
    for i in 0..n {
        let origin = random_point_around(&mut rng, center, extent);
        let direction = if i % 2 == 0 && mesh.triangle_count() > 0 {
            let triangle = rng.random_range(0..mesh.triangle_count());
            let sum = triangle_corners(mesh, triangle)
                .iter()
                .fold(Vector3::zeros(), |acc, p| acc + p.coords);
            Point3::from(sum / 3.0) - origin
        } else {
            Vector3::new(
                rng.random_range(-1.0f32..=1.0),
                rng.random_range(-1.0f32..=1.0),
                rng.random_range(-1.0f32..=1.0),
            )
        };
        if direction.norm() > 1e-3 {
            rays.push(Ray::new(origin, direction));
        }
    }
    rays
}

/// Generates deterministic rays aimed exactly at a vertex (even rays) or at an edge
/// midpoint (odd rays) of a random triangle of `mesh`. Origins lie inside the cube of half
/// extent `extent` around `center`.
pub fn rays_at_vertices_and_edges(
    mesh: &Mesh,
    n: usize,
    center: Point3,
    extent: f32,
    seed: u64,
) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rays = Vec::with_capacity(n);
    for i in 0..n {
        let origin = random_point_around(&mut rng, center, extent);
        let corners = triangle_corners(mesh, rng.random_range(0..mesh.triangle_count()));
        let k = rng.random_range(0..3);
        let target = if i % 2 == 0 {
            corners[k]
        } else {
            nalgebra::center(&corners[k], &corners[(k + 1) % 3])
        };
        if (target - origin).norm() > 1e-3 {
            rays.push(Ray::towards(origin, target));
        }
    }
    rays
}

fn random_point_around(rng: &mut StdRng, center: Point3, extent: f32) -> Point3 {
    center
        + Vector3::new(
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
            rng.random_range(-extent..=extent),
        )
}

fn triangle_corners(mesh: &Mesh, triangle: usize) -> [Point3; 3] {
    [0, 1, 2].map(|k| Point3::from(mesh.positions[mesh.indices[3 * triangle + k] as usize].xyz()))
}

/// `n` triangles whose vertex sums, and therefore centroids, are all identical while their
/// bounding boxes differ. Every split of such a set is degenerate.
pub fn coincident_centroid_mesh(n: usize) -> Mesh {
    let mut mesh = Mesh::default();
    for k in 1..=n as u32 {
        let s = k as f32;
        let corners = [
            Vector3::new(s, 0.0, 0.0),
            Vector3::new(-s, s, 0.0),
            Vector3::new(0.0, -s, 1.0),
        ];
        let base = mesh.positions.len() as u32;
        for corner in &corners {
            mesh.positions
                .push(Vector4::new(corner.x, corner.y, corner.z, 1.0));
            mesh.normals.push(Vector4::new(0.0, 0.0, 1.0, 0.0));
        }
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    mesh
}

/// Asserts that `bh` returns the same closest hit as brute force for every ray: the same
/// hit flag, `t` within `1e-4`, and the same normal.
pub fn assert_matches_brute_force<BH: BoundingHierarchy>(bh: &BH, reference: &Bvh, rays: &[Ray]) {
    for ray in rays {
        let expected = reference.intersect_all_primitives(ray);
        let actual = bh.closest_hit(ray);

        assert_eq!(expected.is_hit, actual.is_hit, "hit flag differs for {:?}", ray);
        if expected.is_hit {
            assert!(
                (expected.t - actual.t).abs() <= 1e-4,
                "t differs for {:?}: {} vs {}",
                ray,
                expected.t,
                actual.t
            );
            assert!(
                (expected.normal - actual.normal).norm() <= 1e-4,
                "normal differs for {:?}: {} vs {}",
                ray,
                expected.normal,
                actual.normal
            );
        }
    }
}

/// Asserts that `query` agrees with brute force on whether each ray hits and on the
/// closest `t`, relative to `max(t, 1)` within `1e-4`. Normals are not compared since rays through a shared edge may report
/// either neighbour.
pub fn assert_same_closest_t<F>(reference: &Bvh, rays: &[Ray], query: F)
where
    F: Fn(&Ray) -> HitInfo,
{
    for ray in rays {
        let expected = reference.intersect_all_primitives(ray);
        let actual = query(ray);

        assert_eq!(expected.is_hit, actual.is_hit, "hit flag differs for {:?}", ray);
        if expected.is_hit {
            assert!(
                (expected.t - actual.t).abs() <= 1e-4 * expected.t.max(1.0),
                "t differs for {:?}: {} vs {}",
                ray,
                expected.t,
                actual.t
            );
        }
    }
}

/// Builds a [`Bvh`] and a brute-force reference for `mesh` with the given config.
pub fn build_with<BH: BoundingHierarchy>(mesh: &Mesh, config: BvhConfig) -> (BH, Bvh) {
    let bh = BH::build(mesh, config).expect("test mesh must be valid");
    let reference = Bvh::build_with_config(mesh, config).expect("test mesh must be valid");
    (bh, reference)
}
