//! Per-face material labels scanned from OBJ text.
//!
//! The scan folds an explicit [`LabelScan`] accumulator over the lines of the
//! file. A `usemtl <name>` directive switches the current material; every
//! following `f` directive is labelled with it. Material ids are assigned in
//! first-encounter order, with `"default"` fixed at id 0 for faces that
//! appear before any `usemtl`.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{AvoxError, Result};

/// Name of the implicit material used before any `usemtl`.
pub const DEFAULT_MATERIAL: &str = "default";

/// Ordered set of unique material names; the index is the material id.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialCatalog {
    names: Vec<String>,
    ids: HashMap<String, i16>,
}

impl MaterialCatalog {
    /// A catalog holding only [`DEFAULT_MATERIAL`] at id 0.
    pub fn new() -> Self {
        let mut ids = HashMap::new();
        ids.insert(DEFAULT_MATERIAL.to_string(), 0);
        Self {
            names: vec![DEFAULT_MATERIAL.to_string()],
            ids,
        }
    }

    /// Id of `name`, registering it if unseen.
    pub fn intern(&mut self, name: &str) -> Result<i16> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }
        let id = i16::try_from(self.names.len()).map_err(|_| {
            AvoxError::consistency(format!(
                "material '{}' exceeds the {} distinct materials a 16-bit label can hold",
                name,
                i16::MAX as usize + 1
            ))
        })?;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Id of an already registered name.
    pub fn id_of(&self, name: &str) -> Option<i16> {
        self.ids.get(name).copied()
    }

    /// Names in id order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of materials, including the default.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: the default material is always present.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for MaterialCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a label scan: the catalog and one material id per face.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialLabels {
    /// Materials in id order.
    pub catalog: MaterialCatalog,
    /// Material id of each face, in file order.
    pub face_labels: Vec<i16>,
}

impl MaterialLabels {
    /// Ensure there is exactly one label per geometry face.
    ///
    /// A mismatch means the geometry loader did not see the same faces in the
    /// same order as the text scan, so labels cannot be trusted.
    pub fn check_face_count(&self, mesh_faces: usize) -> Result<()> {
        if self.face_labels.len() != mesh_faces {
            return Err(AvoxError::consistency(format!(
                "face count mismatch: material scan found {} faces, mesh has {}",
                self.face_labels.len(),
                mesh_faces
            )));
        }
        Ok(())
    }

    /// Material names in id order.
    pub fn names(&self) -> &[String] {
        self.catalog.names()
    }
}

/// Scan accumulator threaded through the lines of one file.
#[derive(Debug, Clone)]
struct LabelScan {
    catalog: MaterialCatalog,
    current: i16,
    face_labels: Vec<i16>,
}

impl LabelScan {
    fn new() -> Self {
        Self {
            catalog: MaterialCatalog::new(),
            current: 0,
            face_labels: Vec::new(),
        }
    }

    fn step(mut self, line: &str) -> Result<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(self);
        }

        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some("usemtl"), Some(name)) => {
                self.current = self.catalog.intern(name)?;
            }
            (Some("f"), _) => self.face_labels.push(self.current),
            _ => {}
        }
        Ok(self)
    }

    fn finish(self) -> MaterialLabels {
        MaterialLabels {
            catalog: self.catalog,
            face_labels: self.face_labels,
        }
    }
}

/// Scan material labels from an OBJ reader.
pub fn scan_material_labels<R: Read>(reader: R) -> Result<MaterialLabels> {
    let scan = BufReader::new(reader)
        .lines()
        .try_fold(LabelScan::new(), |scan, line| scan.step(&line?))?;
    Ok(scan.finish())
}

/// Scan material labels from an OBJ file.
pub fn scan_material_labels_file<P: AsRef<Path>>(path: P) -> Result<MaterialLabels> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        AvoxError::load(format!("cannot open mesh {}: {}", path.display(), e))
    })?;
    scan_material_labels(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_before_any_usemtl() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 3 2\n";
        let labels = scan_material_labels(obj.as_bytes()).unwrap();
        assert_eq!(labels.names(), ["default"]);
        assert_eq!(labels.face_labels, vec![0, 0]);
    }

    #[test]
    fn test_first_encounter_order() {
        let obj = "\
f 1 2 3
usemtl concrete
f 1 2 3
f 1 2 3
usemtl glass
f 1 2 3
usemtl concrete
f 1 2 3
usemtl default
f 1 2 3
";
        let labels = scan_material_labels(obj.as_bytes()).unwrap();
        assert_eq!(labels.names(), ["default", "concrete", "glass"]);
        assert_eq!(labels.face_labels, vec![0, 1, 1, 2, 1, 0]);
        assert_eq!(labels.catalog.id_of("glass"), Some(2));
    }

    #[test]
    fn test_ignores_comments_and_nameless_usemtl() {
        let obj = "\
# usemtl hidden
usemtl wood
usemtl
f 1 2 3
   # f 1 2 3
fo 1 2 3
";
        let labels = scan_material_labels(obj.as_bytes()).unwrap();
        assert_eq!(labels.names(), ["default", "wood"]);
        assert_eq!(labels.face_labels, vec![1]);
    }

    #[test]
    fn test_face_count_check() {
        let labels = scan_material_labels("f 1 2 3\nf 1 2 3\n".as_bytes()).unwrap();
        assert!(labels.check_face_count(2).is_ok());
        assert!(matches!(
            labels.check_face_count(3),
            Err(AvoxError::Consistency { .. })
        ));
    }

    #[test]
    fn test_catalog_overflow() {
        let mut catalog = MaterialCatalog::new();
        for i in 1..=i16::MAX as usize {
            catalog.intern(&format!("m{}", i)).unwrap();
        }
        assert_eq!(catalog.len(), i16::MAX as usize + 1);
        assert!(catalog.intern("m1").is_ok());
        assert!(matches!(
            catalog.intern("one-too-many"),
            Err(AvoxError::Consistency { .. })
        ));
    }
}
