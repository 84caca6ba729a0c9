//! Conversion of the `instances` request envelope into tensor batches.
//!
//! Requests arrive row-wise (one object per instance); runtimes consume
//! column-wise (one batch per named input). This module does the transpose
//! and decodes the b64 escape hatch along the way.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use serde_json::Value;

use api_gen::types::Signature;

use crate::runtime::{TensorBatch, TensorValue};

/// A single conversion problem, reported per field.
#[derive(Debug)]
pub struct ConvertError {
    pub field: String,
    pub msg: String,
}

/// Transpose the `instances` array into per-input column batches.
///
/// Each instance must be an object carrying every input the signature
/// declares; batches come back in the signature's declared input order.
pub fn instances_to_batches(
    signature: &Signature,
    instances: &[Value],
) -> Result<IndexMap<String, TensorBatch>, Vec<ConvertError>> {
    let mut batches: IndexMap<String, TensorBatch> = signature
        .inputs
        .iter()
        .map(|(name, info)| {
            (
                name.clone(),
                TensorBatch {
                    dtype: info.dtype.clone(),
                    rows: Vec::with_capacity(instances.len()),
                },
            )
        })
        .collect();

    let mut errors = Vec::new();

    for (index, instance) in instances.iter().enumerate() {
        let Some(fields) = instance.as_object() else {
            errors.push(ConvertError {
                field: format!("instances[{index}]"),
                msg: "instance is not an object".to_string(),
            });
            continue;
        };

        for (name, batch) in batches.iter_mut() {
            match fields.get(name) {
                Some(value) => match decode_field(value) {
                    Ok(row) => batch.rows.push(row),
                    Err(msg) => errors.push(ConvertError {
                        field: format!("instances[{index}].{name}"),
                        msg,
                    }),
                },
                None => errors.push(ConvertError {
                    field: format!("instances[{index}].{name}"),
                    msg: "missing input".to_string(),
                }),
            }
        }
    }

    if errors.is_empty() { Ok(batches) } else { Err(errors) }
}

/// Decode one instance field, honoring the b64 escape hatch.
fn decode_field(value: &Value) -> Result<TensorValue, String> {
    if let Some(encoded) = value.get("b64").and_then(Value::as_str) {
        return BASE64
            .decode(encoded)
            .map(TensorValue::Bytes)
            .map_err(|e| format!("invalid base64 payload: {e}"));
    }
    Ok(TensorValue::Json(value.clone()))
}
