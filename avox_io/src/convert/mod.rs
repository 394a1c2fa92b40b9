//! Mesh input: geometry loading and the per-face material scan.
//!
//! Both readers walk the same OBJ text independently and must agree on the
//! face order; [`MaterialLabels::check_face_count`] enforces that they agree
//! on the face count.

pub mod materials;
pub mod obj_import;

pub use materials::{
    scan_material_labels, scan_material_labels_file, MaterialCatalog, MaterialLabels,
    DEFAULT_MATERIAL,
};
pub use obj_import::{parse_obj, parse_obj_file, TriangleMesh};
