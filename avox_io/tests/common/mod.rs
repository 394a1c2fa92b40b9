//! Shared mesh fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Unit cube as 12 outward-facing triangles, sides tagged with two materials.
pub const CUBE_OBJ: &str = "\
# unit cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
usemtl floor
f 1 3 2
f 1 4 3
usemtl ceiling
f 5 6 7
f 5 7 8
usemtl wall
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

/// The same cube written with quads.
pub const QUAD_CUBE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 4 8 7 3
f 1 5 8 4
f 2 3 7 6
";

/// Minimal valid material config.
pub const DIF_JSON: &str = r#"{
  "materials": {"floor": [0.1, 0.2], "ceiling": [0.3, 0.3], "wall": [0.05, 0.05]},
  "bands_hz": [250, 1000]
}"#;

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
