pub mod error;
pub mod manifest;
pub mod schema;
pub mod types;

use crate::error::Result;
use crate::manifest::parse_signatures;
use crate::schema::generate_api_description;

/// High-level API: parse a signature manifest and produce the Swagger
/// description of its prediction API.
///
/// `manifest_json`: the full JSON signature manifest of an exported bundle.
pub fn describe_manifest(manifest_json: &str) -> Result<serde_json::Value> {
    let signatures = parse_signatures(manifest_json)?;
    generate_api_description(&signatures)
}
