//! OBJ import - triangle geometry for field evaluation.
//!
//! Faces are kept in file order: polygon `k` in the file becomes the
//! triangles of its fan, appended after those of polygon `k - 1`. Nothing is
//! merged, deduplicated or reordered, so per-face data scanned from the same
//! file lines up with [`TriangleMesh::triangles`] by index.
//!
//! Supported directives: `v x y z [w]` and `f` with `i`, `i/t`, `i//n` or
//! `i/t/n` references (1-based, negative values are relative). Everything
//! else (`vn`, `vt`, `usemtl`, `o`, `g`, ...) is ignored here.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use avox_core::{triangle_normal, Point3};

use crate::error::{AvoxError, Result};

/// Parsed triangle mesh.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (3 per triangle), in file order.
    pub triangles: Vec<[usize; 3]>,
    /// Unit face normal per triangle (zero for degenerate faces).
    pub face_normals: Vec<Point3>,
}

impl TriangleMesh {
    /// Build a mesh from raw geometry, validating indices and deriving face normals.
    pub fn new(vertices: Vec<Point3>, triangles: Vec<[usize; 3]>) -> Result<Self> {
        if let Some((face, tri)) = triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&i| i >= vertices.len()))
        {
            return Err(AvoxError::load(format!(
                "face {} references vertex {:?} but only {} vertices exist",
                face,
                tri,
                vertices.len()
            )));
        }

        let face_normals = triangles
            .iter()
            .map(|&[i0, i1, i2]| triangle_normal(vertices[i0], vertices[i1], vertices[i2]))
            .collect();

        Ok(Self {
            vertices,
            triangles,
            face_normals,
        })
    }

    /// Number of triangles.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner positions of triangle `idx`.
    #[inline]
    pub fn triangle(&self, idx: usize) -> [Point3; 3] {
        let [i0, i1, i2] = self.triangles[idx];
        [self.vertices[i0], self.vertices[i1], self.vertices[i2]]
    }

    /// Axis-aligned bounds of the vertices referenced by faces.
    ///
    /// Returns `None` for a mesh without faces.
    pub fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let mut corners = self.triangles.iter().flatten().map(|&i| self.vertices[i]);
        let first = corners.next()?;
        Some(corners.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
    }
}

fn parse_coord(token: Option<&str>, axis: char, line_no: usize) -> Result<f64> {
    let token = token.ok_or_else(|| {
        AvoxError::load(format!("line {}: missing vertex {}", line_no, axis))
    })?;
    token.parse().map_err(|_| {
        AvoxError::load(format!(
            "line {}: invalid vertex {} '{}'",
            line_no, axis, token
        ))
    })
}

fn resolve_index(token: &str, vertex_count: usize, line_no: usize) -> Result<usize> {
    let idx_str = token.split('/').next().unwrap_or(token);
    let idx: i64 = idx_str.parse().map_err(|_| {
        AvoxError::load(format!("line {}: invalid face index '{}'", line_no, idx_str))
    })?;

    // OBJ indices are 1-based, negative values count back from the last vertex
    let resolved = match idx {
        i if i > 0 => i - 1,
        i if i < 0 => vertex_count as i64 + i,
        _ => -1,
    };
    if resolved < 0 {
        return Err(AvoxError::load(format!(
            "line {}: face index {} does not resolve to a vertex",
            line_no, idx
        )));
    }
    Ok(resolved as usize)
}

/// Parse an OBJ file from a reader.
pub fn parse_obj<R: Read>(reader: R) -> Result<TriangleMesh> {
    let buf_reader = BufReader::new(reader);
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    for (line_idx, line) in buf_reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = line_idx + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let x = parse_coord(parts.next(), 'x', line_no)?;
                let y = parse_coord(parts.next(), 'y', line_no)?;
                let z = parse_coord(parts.next(), 'z', line_no)?;
                vertices.push(Point3::new(x, y, z));
            }
            Some("f") => {
                let face = parts
                    .map(|part| resolve_index(part, vertices.len(), line_no))
                    .collect::<Result<Vec<usize>>>()?;

                if face.len() < 3 {
                    return Err(AvoxError::load(format!(
                        "line {}: face needs at least 3 vertices, got {}",
                        line_no,
                        face.len()
                    )));
                }
                // Fan triangulation keeps the polygon's triangles contiguous
                for i in 1..face.len() - 1 {
                    triangles.push([face[0], face[i], face[i + 1]]);
                }
            }
            _ => {}
        }
    }

    TriangleMesh::new(vertices, triangles)
}

/// Parse an OBJ file from a path.
pub fn parse_obj_file<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        AvoxError::load(format!("cannot open mesh {}: {}", path.display(), e))
    })?;
    parse_obj(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_OBJ: &str = r#"
# Unit cube, outward-facing (CCW from outside)
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1

f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
"#;

    #[test]
    fn test_parse_obj() {
        let mesh = parse_obj(CUBE_OBJ.as_bytes()).unwrap();

        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.face_normals.len(), 12);
        // First face lies on z=0 and faces -z
        assert_eq!(mesh.face_normals[0], Point3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_bounding_box() {
        let mesh = parse_obj(CUBE_OBJ.as_bytes()).unwrap();
        let (min, max) = mesh.bounding_box().unwrap();

        assert_eq!(min, Point3::splat(0.0));
        assert_eq!(max, Point3::splat(1.0));
    }

    #[test]
    fn test_bounding_box_ignores_unreferenced_vertices() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 50 50 50\nf 1 2 3\n";
        let mesh = parse_obj(obj.as_bytes()).unwrap();
        let (_, max) = mesh.bounding_box().unwrap();
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_face_reference_forms_and_fan() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
f -4//1 -3//1 -2//1
";
        let mesh = parse_obj(obj.as_bytes()).unwrap();
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3], [0, 1, 2]]);
    }

    #[test]
    fn test_invalid_index_is_load_error() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        assert!(matches!(parse_obj(obj.as_bytes()), Err(AvoxError::Load { .. })));

        let obj = "v 0 0 0\nf 0 1 1\n";
        assert!(matches!(parse_obj(obj.as_bytes()), Err(AvoxError::Load { .. })));

        let obj = "v 0 0 zz\n";
        assert!(matches!(parse_obj(obj.as_bytes()), Err(AvoxError::Load { .. })));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        let mesh = parse_obj("# nothing\nv 0 0 0\n".as_bytes()).unwrap();
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.bounding_box().is_none());
    }
}
