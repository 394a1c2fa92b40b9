//! Shared fixtures for unit tests.

use avox_core::Point3;

use crate::convert::TriangleMesh;

/// Axis-aligned unit cube `[0,1]^3` as 12 outward-facing triangles.
///
/// Triangles 0-1 lie on z=0, 2-3 on z=1, 4-5 on y=0, 6-7 on y=1,
/// 8-9 on x=0 and 10-11 on x=1.
pub(crate) fn unit_cube() -> TriangleMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let triangles = vec![
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [3, 7, 6],
        [3, 6, 2],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];
    TriangleMesh::new(vertices, triangles).expect("cube indices are valid")
}
