//! Exhaustive nearest-triangle search.

use avox_core::{closest_point_on_triangle, Point3};

use super::{NearestSurface, SurfaceHit};
use crate::convert::TriangleMesh;

/// Linear scan over every triangle of a mesh.
///
/// Always available; O(triangles) per query.
#[derive(Debug, Clone, Copy)]
pub struct BruteForce<'m> {
    mesh: &'m TriangleMesh,
}

impl<'m> BruteForce<'m> {
    /// Wrap a mesh.
    pub fn new(mesh: &'m TriangleMesh) -> Self {
        Self { mesh }
    }
}

impl NearestSurface for BruteForce<'_> {
    fn mesh(&self) -> &TriangleMesh {
        self.mesh
    }

    fn nearest(&self, query: Point3) -> Option<SurfaceHit> {
        let mut best: Option<SurfaceHit> = None;
        for tri_idx in 0..self.mesh.face_count() {
            let [a, b, c] = self.mesh.triangle(tri_idx);
            let (closest, _) = closest_point_on_triangle(query, a, b, c);
            let distance_squared = (query - closest).length_squared();

            // Strict `<` keeps the first (lowest-index) triangle on ties
            if best.map_or(true, |hit| distance_squared < hit.distance_squared) {
                best = Some(SurfaceHit {
                    triangle: tri_idx,
                    closest,
                    distance_squared,
                });
            }
        }
        best
    }
}
