//! Bounding Volume Hierarchy for O(log n) nearest-triangle queries.
//!
//! Binary BVH split at the centroid median of the longest axis. Queries
//! return exactly what the brute-force scan returns: the smallest squared
//! distance, ties broken towards the lowest triangle index. To keep that
//! guarantee under rounding, nodes are only pruned when their box is farther
//! than the current best by more than a small slack.

use std::cmp::Ordering;

use avox_core::{closest_point_on_triangle, Point3};

use super::SurfaceHit;
use crate::convert::TriangleMesh;

/// Relative slack applied before discarding a node.
const PRUNE_SLACK: f64 = 1e-9;
/// Absolute slack, for queries lying on the surface.
const PRUNE_FLOOR: f64 = 1e-18;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Aabb {
    /// Create an empty (inverted) AABB.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Point3::splat(f64::MAX),
            max: Point3::splat(f64::MIN),
        }
    }

    /// Create an AABB from a triangle.
    #[inline]
    pub fn from_triangle([v0, v1, v2]: [Point3; 3]) -> Self {
        Self {
            min: v0.min(v1).min(v2),
            max: v0.max(v1).max(v2),
        }
    }

    /// Compute the union of two AABBs.
    #[inline]
    pub fn union(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Squared distance from a point to this AABB (0.0 inside).
    #[inline]
    pub fn distance_squared(&self, p: Point3) -> f64 {
        let dx = libm::fmax(self.min.x - p.x, libm::fmax(0.0, p.x - self.max.x));
        let dy = libm::fmax(self.min.y - p.y, libm::fmax(0.0, p.y - self.max.y));
        let dz = libm::fmax(self.min.z - p.z, libm::fmax(0.0, p.z - self.max.z));
        dx * dx + dy * dy + dz * dz
    }

    /// Get the longest axis (0=x, 1=y, 2=z).
    #[inline]
    pub fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Get the centroid of this AABB.
    #[inline]
    pub fn centroid(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }
}

/// BVH node.
enum BvhNode {
    /// Leaf node containing triangle indices.
    Leaf {
        bounds: Aabb,
        triangle_indices: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        bounds: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } => bounds,
            BvhNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// Best candidate found so far during a query.
struct Candidate {
    triangle: usize,
    closest: Point3,
    distance_squared: f64,
}

impl Candidate {
    /// Lexicographic `(distance, index)` order, matching a linear scan with strict `<`.
    #[inline]
    fn is_beaten_by(&self, distance_squared: f64, triangle: usize) -> bool {
        distance_squared < self.distance_squared
            || (distance_squared == self.distance_squared && triangle < self.triangle)
    }
}

/// Triangle BVH.
///
/// The BVH does not own triangle data; the mesh it was built from must be
/// passed to queries.
pub struct TriangleBvh {
    root: Option<BvhNode>,
    num_triangles: usize,
}

impl TriangleBvh {
    /// Build a BVH over every triangle of `mesh`.
    ///
    /// `max_leaf_size` bounds the triangles per leaf (typically 4-8).
    pub fn build(mesh: &TriangleMesh, max_leaf_size: usize) -> Self {
        let num_triangles = mesh.face_count();
        if num_triangles == 0 {
            return Self {
                root: None,
                num_triangles,
            };
        }

        let triangle_bounds: Vec<Aabb> = (0..num_triangles)
            .map(|idx| Aabb::from_triangle(mesh.triangle(idx)))
            .collect();
        let indices: Vec<usize> = (0..num_triangles).collect();
        let root = Self::build_recursive(&triangle_bounds, indices, max_leaf_size.max(1));

        Self {
            root: Some(root),
            num_triangles,
        }
    }

    fn build_recursive(
        triangle_bounds: &[Aabb],
        mut indices: Vec<usize>,
        max_leaf_size: usize,
    ) -> BvhNode {
        let bounds = indices
            .iter()
            .fold(Aabb::empty(), |acc, &idx| acc.union(&triangle_bounds[idx]));

        if indices.len() <= max_leaf_size {
            return BvhNode::Leaf {
                bounds,
                triangle_indices: indices,
            };
        }

        let axis = bounds.longest_axis();
        indices.sort_by(|&a, &b| {
            let ca = triangle_bounds[a].centroid()[axis];
            let cb = triangle_bounds[b].centroid()[axis];
            ca.partial_cmp(&cb).unwrap_or(Ordering::Equal).then(a.cmp(&b))
        });

        let mid = indices.len() / 2;
        let right_indices = indices.split_off(mid);
        let left = Self::build_recursive(triangle_bounds, indices, max_leaf_size);
        let right = Self::build_recursive(triangle_bounds, right_indices, max_leaf_size);

        BvhNode::Internal {
            bounds,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Find the nearest triangle of `mesh` to `query`.
    ///
    /// Returns `None` if the BVH is empty.
    pub fn nearest_triangle(&self, mesh: &TriangleMesh, query: Point3) -> Option<SurfaceHit> {
        let root = self.root.as_ref()?;
        let mut best: Option<Candidate> = None;
        Self::nearest_recursive(root, mesh, query, &mut best);
        best.map(|c| SurfaceHit {
            triangle: c.triangle,
            closest: c.closest,
            distance_squared: c.distance_squared,
        })
    }

    fn nearest_recursive(
        node: &BvhNode,
        mesh: &TriangleMesh,
        query: Point3,
        best: &mut Option<Candidate>,
    ) {
        if let Some(current) = best {
            let bound = current.distance_squared * (1.0 + PRUNE_SLACK) + PRUNE_FLOOR;
            if node.bounds().distance_squared(query) > bound {
                return;
            }
        }

        match node {
            BvhNode::Leaf {
                triangle_indices, ..
            } => {
                for &tri_idx in triangle_indices {
                    let [a, b, c] = mesh.triangle(tri_idx);
                    let (closest, _) = closest_point_on_triangle(query, a, b, c);
                    let distance_squared = (query - closest).length_squared();

                    let improves = match best {
                        Some(current) => current.is_beaten_by(distance_squared, tri_idx),
                        None => true,
                    };
                    if improves {
                        *best = Some(Candidate {
                            triangle: tri_idx,
                            closest,
                            distance_squared,
                        });
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                // Visit closer child first
                let left_dist = left.bounds().distance_squared(query);
                let right_dist = right.bounds().distance_squared(query);

                if left_dist <= right_dist {
                    Self::nearest_recursive(left, mesh, query, best);
                    Self::nearest_recursive(right, mesh, query, best);
                } else {
                    Self::nearest_recursive(right, mesh, query, best);
                    Self::nearest_recursive(left, mesh, query, best);
                }
            }
        }
    }

    /// Check if the BVH is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Get the number of triangles in the BVH.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.num_triangles
    }

    /// Get the bounds of the entire BVH.
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|r| *r.bounds())
    }
}
