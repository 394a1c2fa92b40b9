//! One-time choice of nearest-surface strategy for a run.
//!
//! The choice is made by [`QueryStrategy::probe`] before any evaluation and
//! never revisited per query, so every chunk of a run sees the same strategy.

use std::fmt;

use avox_core::Point3;
use log::info;

#[cfg(feature = "bvh")]
use super::bvh::TriangleBvh;
use super::{BruteForce, NearestSurface, SurfaceHit};
use crate::config::StrategyPreference;
use crate::convert::TriangleMesh;

/// Triangles per BVH leaf.
#[cfg(feature = "bvh")]
const BVH_LEAF_SIZE: usize = 4;

/// Which strategy a run ended up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// BVH-backed queries.
    Accelerated,
    /// Exhaustive scan.
    Fallback,
}

impl StrategyKind {
    /// Short lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Accelerated => "accelerated",
            StrategyKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The selected nearest-surface strategy, bound to one mesh.
pub enum QueryStrategy<'m> {
    /// BVH over the mesh.
    #[cfg(feature = "bvh")]
    Accelerated {
        /// Mesh the hierarchy was built from.
        mesh: &'m TriangleMesh,
        /// The hierarchy.
        bvh: TriangleBvh,
    },
    /// Brute-force scan.
    Fallback(BruteForce<'m>),
}

impl<'m> QueryStrategy<'m> {
    /// Pick a strategy for `mesh`.
    ///
    /// `Auto` uses the accelerated strategy when the `bvh` feature is
    /// compiled in and substitutes the fallback (with a warning) otherwise.
    pub fn probe(mesh: &'m TriangleMesh, preference: StrategyPreference) -> Self {
        match preference {
            StrategyPreference::Fallback => {
                info!("nearest-surface strategy: fallback (requested)");
                Self::Fallback(BruteForce::new(mesh))
            }
            StrategyPreference::Auto => Self::auto(mesh),
        }
    }

    #[cfg(feature = "bvh")]
    fn auto(mesh: &'m TriangleMesh) -> Self {
        let bvh = TriangleBvh::build(mesh, BVH_LEAF_SIZE);
        info!(
            "nearest-surface strategy: accelerated (BVH over {} triangles)",
            bvh.num_triangles()
        );
        Self::Accelerated { mesh, bvh }
    }

    #[cfg(not(feature = "bvh"))]
    fn auto(mesh: &'m TriangleMesh) -> Self {
        log::warn!("accelerated nearest-surface queries not compiled in; using brute-force fallback");
        Self::Fallback(BruteForce::new(mesh))
    }

    /// Which strategy was selected.
    pub fn kind(&self) -> StrategyKind {
        match self {
            #[cfg(feature = "bvh")]
            Self::Accelerated { .. } => StrategyKind::Accelerated,
            Self::Fallback(_) => StrategyKind::Fallback,
        }
    }
}

impl NearestSurface for QueryStrategy<'_> {
    fn mesh(&self) -> &TriangleMesh {
        match self {
            #[cfg(feature = "bvh")]
            Self::Accelerated { mesh, .. } => *mesh,
            Self::Fallback(brute) => brute.mesh(),
        }
    }

    fn nearest(&self, query: Point3) -> Option<SurfaceHit> {
        match self {
            #[cfg(feature = "bvh")]
            Self::Accelerated { mesh, bvh } => bvh.nearest_triangle(mesh, query),
            Self::Fallback(brute) => brute.nearest(query),
        }
    }
}
