#![no_main]
use std::fmt::{self, Debug, Formatter};

use approx::{abs_diff_eq, relative_eq};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use meshbvh::bvh::Bvh;
use meshbvh::config::BvhConfig;
use meshbvh::mesh::Mesh;
use meshbvh::ray::Ray;
use meshbvh::{Point3, Vector3, Vector4};
use ordered_float::NotNan;

type Float = f32;
const LIMIT: Float = 1_000_000.0;

fuzz_target!(|workload: Workload| {
    workload.fuzz();
});

#[derive(Arbitrary)]
struct ArbitraryPoint {
    coordinates: [NotNan<Float>; 3],
}

impl ArbitraryPoint {
    fn point(&self) -> Point3 {
        nalgebra::Point3::from_slice(&self.coordinates).map(|f| f.into_inner().clamp(-LIMIT, LIMIT))
    }
}

impl Debug for ArbitraryPoint {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.point(), f)
    }
}

#[derive(Debug, Arbitrary)]
struct ArbitraryTriangle {
    a: ArbitraryPoint,
    b: ArbitraryPoint,
    c: ArbitraryPoint,
    normal: ArbitraryPoint,
}

#[derive(Arbitrary)]
struct ArbitraryRay {
    origin: ArbitraryPoint,
    destination: ArbitraryPoint,
}

impl Debug for ArbitraryRay {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.ray(), f)
    }
}

impl ArbitraryRay {
    fn ray(&self) -> Ray {
        let mut direction = self.destination.point() - self.origin.point();
        // Ensure no degenerate direction.
        if direction.norm() < 1e-3 || direction.iter().any(|f| !f.is_finite()) {
            direction = Vector3::new(1.0, 1.0, 1.0);
        }
        let ray = Ray::new(self.origin.point(), direction);
        assert!(
            abs_diff_eq!(ray.direction.norm(), 1.0, epsilon = 1e-3),
            "{}",
            ray.direction.norm()
        );
        ray
    }
}

#[derive(Debug, Arbitrary)]
struct ArbitraryConfig {
    max_depth: u8,
    max_leaf_triangles: u8,
}

#[derive(Debug, Arbitrary)]
struct Workload {
    triangles: Vec<ArbitraryTriangle>,
    /// Replaces the generated index array to exercise mesh validation.
    raw_indices: Option<Vec<u32>>,
    config: ArbitraryConfig,
    ray: ArbitraryRay,
}

impl Workload {
    fn mesh(&self) -> Mesh {
        let mut mesh = Mesh::default();
        for (i, triangle) in self.triangles.iter().enumerate() {
            let normal = triangle.normal.point();
            for corner in [&triangle.a, &triangle.b, &triangle.c] {
                let p = corner.point();
                mesh.positions.push(Vector4::new(p.x, p.y, p.z, 1.0));
                mesh.normals
                    .push(Vector4::new(normal.x, normal.y, normal.z, 0.0));
            }
            let base = 3 * i as u32;
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        if let Some(indices) = &self.raw_indices {
            mesh.indices = indices.clone();
        }
        mesh
    }

    fn fuzz(self) {
        if self.triangles.len() > 256 {
            return;
        }

        let config = BvhConfig::default()
            .with_max_depth(self.config.max_depth as u32)
            .with_max_leaf_triangles(self.config.max_leaf_triangles as u32);
        let mesh = self.mesh();
        let bvh = match Bvh::build_with_config(&mesh, config) {
            Ok(bvh) => bvh,
            Err(_) => {
                assert!(mesh.validate().is_err());
                return;
            }
        };

        // Check that these don't panic.
        bvh.assert_consistent();
        bvh.assert_tight();
        let flat_bvh = bvh.flatten();

        let ray = self.ray.ray();
        let brute = bvh.intersect_all_primitives(&ray);
        let results = [
            bvh.intersect_ray(&ray),
            bvh.intersect_ordered(&ray),
            flat_bvh.intersect(&ray),
        ];

        for hit in results {
            assert_eq!(brute.is_hit, hit.is_hit, "{:?} vs brute force {:?}", hit, brute);
            if brute.is_hit {
                assert!(
                    relative_eq!(hit.t, brute.t, epsilon = 1e-4, max_relative = 1e-4),
                    "{} vs brute force {}",
                    hit.t,
                    brute.t
                );
            }
        }
    }
}
