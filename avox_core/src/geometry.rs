//! Point-to-triangle primitives shared by every nearest-surface strategy.
//!
//! All strategies route through [`closest_point_on_triangle`] so they produce
//! bit-identical distances for the same triangle.

use crate::types::{Point3, MERGE_TOLERANCE};

/// Unit normal of triangle `(a, b, c)` with counter-clockwise winding.
///
/// Degenerate triangles yield the zero vector.
#[inline]
pub fn triangle_normal(a: Point3, b: Point3, c: Point3) -> Point3 {
    (b - a).cross(c - a).normalize()
}

/// Compute the closest point on triangle `(a, b, c)` to `p`.
///
/// Uses the Voronoi-region walk: vertex regions first, then edges, then the
/// face interior. Returns `(closest_point, barycentric_coordinates)`.
pub fn closest_point_on_triangle(p: Point3, a: Point3, b: Point3, c: Point3) -> (Point3, [f64; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let denom = va + vb + vc;
    if denom == 0.0 {
        // Collinear or coincident vertices that slipped past the edge tests.
        return (a, [1.0, 0.0, 0.0]);
    }
    let v = vb / denom;
    let w = vc / denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}

/// Attach a sign to an unsigned distance using the closest face's normal.
///
/// Points within [`MERGE_TOLERANCE`] of the surface keep the unsigned value.
/// Otherwise the sign of `normal · (query - closest)` decides: negative is
/// inside, positive or exactly zero is outside.
#[inline]
pub fn signed_from_face_normal(distance: f64, query: Point3, closest: Point3, normal: Point3) -> f64 {
    if distance <= MERGE_TOLERANCE {
        return distance;
    }
    if normal.dot(query - closest) < 0.0 {
        -distance
    } else {
        distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_point_interior() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        let (closest, bary) = closest_point_on_triangle(Point3::new(0.25, 0.25, 1.0), a, b, c);

        assert!((closest.x - 0.25).abs() < 1e-12);
        assert!((closest.y - 0.25).abs() < 1e-12);
        assert!(closest.z.abs() < 1e-12);
        assert!((bary[0] + bary[1] + bary[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_closest_point_vertex_and_edge_regions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);

        let (closest, _) = closest_point_on_triangle(Point3::new(-1.0, -1.0, 0.0), a, b, c);
        assert_eq!(closest, a);

        let (closest, _) = closest_point_on_triangle(Point3::new(2.0, -0.5, 0.0), a, b, c);
        assert_eq!(closest, b);

        let (closest, bary) = closest_point_on_triangle(Point3::new(0.5, -1.0, 0.0), a, b, c);
        assert!((closest.x - 0.5).abs() < 1e-12);
        assert_eq!(closest.y, 0.0);
        assert_eq!(bary[2], 0.0);

        let (closest, _) = closest_point_on_triangle(Point3::new(1.0, 1.0, 0.0), a, b, c);
        assert!((closest.x - 0.5).abs() < 1e-12);
        assert!((closest.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_triangle_does_not_produce_nan() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let (closest, _) = closest_point_on_triangle(Point3::new(1.0, 2.0, 3.0), a, a, a);
        assert!(closest.is_finite());
        assert_eq!(triangle_normal(a, a, a), Point3::splat(0.0));
    }

    #[test]
    fn test_triangle_normal_winding() {
        let n = triangle_normal(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(n, Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_sign_rule() {
        let closest = Point3::new(0.0, 0.0, 0.0);
        let up = Point3::new(0.0, 0.0, 1.0);

        assert_eq!(signed_from_face_normal(1.0, Point3::new(0.0, 0.0, 1.0), closest, up), 1.0);
        assert_eq!(signed_from_face_normal(1.0, Point3::new(0.0, 0.0, -1.0), closest, up), -1.0);
    }

    #[test]
    fn test_sign_rule_zero_dot_is_outside() {
        let closest = Point3::new(0.0, 0.0, 0.0);
        let up = Point3::new(0.0, 0.0, 1.0);
        // Query lies in the triangle's plane: dot is exactly zero.
        let d = signed_from_face_normal(2.0, Point3::new(2.0, 0.0, 0.0), closest, up);
        assert_eq!(d, 2.0);
        // Degenerate normal also resolves to outside.
        let d = signed_from_face_normal(2.0, Point3::new(0.0, 0.0, -2.0), closest, Point3::splat(0.0));
        assert_eq!(d, 2.0);
    }

    #[test]
    fn test_sign_rule_within_tolerance_keeps_unsigned() {
        let closest = Point3::new(0.0, 0.0, 0.0);
        let up = Point3::new(0.0, 0.0, 1.0);
        let d = signed_from_face_normal(1e-9, Point3::new(0.0, 0.0, -1e-9), closest, up);
        assert_eq!(d, 1e-9);
    }
}
