//! Material absorption config (DIF) validation and normalisation.
//!
//! The document must be a JSON object with `bands_hz` and `materials` keys.
//! `sample_rate` defaults to 48000. Beyond that the content is passed
//! through untouched; it is written back key-sorted so identical configs
//! always produce identical bytes.

use std::fs;
use std::path::Path;

use log::info;
use serde_json::{Map, Value};

use crate::error::{AvoxError, Result};

/// Sample rate assumed when the config does not name one.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

const REQUIRED_KEYS: [&str; 2] = ["bands_hz", "materials"];

/// A validated material config.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialConfig {
    document: Map<String, Value>,
}

impl MaterialConfig {
    /// Validate a parsed document and fill in defaults.
    ///
    /// # Errors
    /// `Schema` if the document is not an object or lacks a required key.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut document) = value else {
            return Err(AvoxError::schema("material config must be a JSON object"));
        };

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !document.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(AvoxError::schema(format!(
                "material config requires 'bands_hz' and 'materials' keys (missing: {})",
                missing.join(", ")
            )));
        }

        document
            .entry("sample_rate")
            .or_insert_with(|| Value::from(DEFAULT_SAMPLE_RATE));
        Ok(Self { document })
    }

    /// Parse and validate JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| AvoxError::load(format!("invalid material config JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Read and validate a config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            AvoxError::load(format!("cannot read material config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// The validated document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// Number of materials: entries of `materials` when it is an object or array.
    pub fn material_count(&self) -> usize {
        match &self.document["materials"] {
            Value::Object(map) => map.len(),
            Value::Array(list) => list.len(),
            _ => 0,
        }
    }

    /// The document as two-space indented JSON with keys sorted at every level.
    pub fn to_pretty_json(&self) -> Result<String> {
        let sorted = sort_keys(Value::Object(self.document.clone()));
        serde_json::to_string_pretty(&sorted).map_err(|e| AvoxError::Io(e.into()))
    }

    /// Write the normalised document to `path`, creating parent directories.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_pretty_json()?)?;
        info!(
            "wrote DIF => {} (materials={})",
            path.display(),
            self.material_count()
        );
        Ok(())
    }
}

/// Rebuild `value` with every object's keys in ascending order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
