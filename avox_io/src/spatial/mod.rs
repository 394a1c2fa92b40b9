//! Nearest-surface queries over a triangle mesh.
//!
//! This module provides:
//! - `bvh`: Bounding Volume Hierarchy for O(log n) triangle queries
//! - `brute_force`: Exhaustive scan over every triangle
//! - `strategy`: One-time selection between the two
//!
//! Every implementation returns the same [`SurfaceHit`] for the same query:
//! minimum squared distance, ties resolved to the lowest triangle index.

pub mod brute_force;
#[cfg(feature = "bvh")]
pub mod bvh;
pub mod strategy;

use avox_core::{signed_from_face_normal, Point3};

use crate::convert::TriangleMesh;

pub use brute_force::BruteForce;
#[cfg(feature = "bvh")]
pub use bvh::{Aabb, TriangleBvh};
pub use strategy::{QueryStrategy, StrategyKind};

/// Closest surface point found for a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Index of the nearest triangle.
    pub triangle: usize,
    /// Closest point on that triangle.
    pub closest: Point3,
    /// Squared distance from the query to `closest`.
    pub distance_squared: f64,
}

impl SurfaceHit {
    /// Unsigned distance to the surface.
    #[inline]
    pub fn distance(&self) -> f64 {
        libm::sqrt(self.distance_squared)
    }
}

/// A nearest-triangle query over one mesh.
///
/// Implementations are stateless per call and shared across worker threads.
pub trait NearestSurface: Sync {
    /// The mesh being queried.
    fn mesh(&self) -> &TriangleMesh;

    /// Nearest triangle to `query`, or `None` for a mesh without triangles.
    fn nearest(&self, query: Point3) -> Option<SurfaceHit>;

    /// Signed distance to the surface, negative inside.
    ///
    /// The sign comes from the nearest triangle's face normal.
    fn signed_distance(&self, query: Point3) -> Option<f64> {
        let hit = self.nearest(query)?;
        let normal = self.mesh().face_normals[hit.triangle];
        Some(signed_from_face_normal(
            hit.distance(),
            query,
            hit.closest,
            normal,
        ))
    }
}
