//! Signature manifest adapter.
//!
//! An exported bundle describes its entry points in a JSON manifest written
//! at export time:
//!
//! ```json
//! {
//!   "signatures": {
//!     "serving_default": {
//!       "inputs": {
//!         "image_input": {"dtype": "float32", "shape": [-1, 784]}
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! This is the only place the generator touches the bundle format; everything
//! downstream works on [`Signature`] values.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::types::{Signature, TensorInfo};

#[derive(Debug, Deserialize)]
struct RawManifest {
    signatures: IndexMap<String, RawSignature>,
}

#[derive(Debug, Deserialize)]
struct RawSignature {
    inputs: IndexMap<String, TensorInfo>,
}

/// Parse a signature manifest, preserving signature and input discovery order.
///
/// A signature declaring no inputs is rejected: the exporter always records
/// at least one input tensor per entry point, so an empty mapping means the
/// bundle metadata is malformed.
pub fn parse_signatures(manifest_json: &str) -> Result<Vec<Signature>> {
    let raw: RawManifest =
        serde_json::from_str(manifest_json).map_err(|e| ApiError::ManifestParse(e.to_string()))?;

    let mut signatures = Vec::with_capacity(raw.signatures.len());
    for (name, signature) in raw.signatures {
        if signature.inputs.is_empty() {
            return Err(ApiError::EmptySignature(name));
        }
        signatures.push(Signature {
            name,
            inputs: signature.inputs,
        });
    }
    Ok(signatures)
}

/// Read and parse a manifest file.
pub fn load_signatures(path: &Path) -> Result<Vec<Signature>> {
    if !path.exists() {
        return Err(ApiError::ManifestNotFound(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| ApiError::Other(format!("failed to read {}: {e}", path.display())))?;

    parse_signatures(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dim;

    const MANIFEST: &str = r#"{
        "signatures": {
            "alt": {
                "inputs": {
                    "b": {"dtype": "int64", "shape": []},
                    "a": {"dtype": "float32", "shape": [-1, 4]}
                }
            },
            "serving_default": {
                "inputs": {
                    "image_input": {"dtype": "float32", "shape": [null, 784]}
                }
            }
        }
    }"#;

    #[test]
    fn parses_signatures_in_discovery_order() {
        let signatures = parse_signatures(MANIFEST).unwrap();
        let names: Vec<&str> = signatures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alt", "serving_default"]);

        // Input order is declaration order, not alphabetical.
        let inputs: Vec<&str> = signatures[0].inputs.keys().map(String::as_str).collect();
        assert_eq!(inputs, vec!["b", "a"]);
    }

    #[test]
    fn parses_dynamic_dimension_markers() {
        let signatures = parse_signatures(MANIFEST).unwrap();
        let image = &signatures[1].inputs["image_input"];
        assert_eq!(image.shape, vec![Dim::Dynamic, Dim::Fixed(784)]);

        let scalar = &signatures[0].inputs["b"];
        assert_eq!(scalar.rank(), 0);
    }

    #[test]
    fn rejects_malformed_manifest() {
        assert!(matches!(
            parse_signatures("{\"signatures\": 3}"),
            Err(ApiError::ManifestParse(_))
        ));
    }

    #[test]
    fn rejects_signature_without_inputs() {
        let manifest = r#"{"signatures": {"empty": {"inputs": {}}}}"#;
        let err = parse_signatures(manifest).unwrap_err();
        assert!(matches!(err, ApiError::EmptySignature(name) if name == "empty"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_signatures(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(matches!(err, ApiError::ManifestNotFound(_)));
    }

    #[test]
    fn load_reads_manifest_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signatures.json");
        std::fs::write(&path, MANIFEST).unwrap();

        let signatures = load_signatures(&path).unwrap();
        assert_eq!(signatures.len(), 2);
    }
}
