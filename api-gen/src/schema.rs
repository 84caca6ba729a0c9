//! Swagger 2.0 document synthesis from signature metadata.
//!
//! Produces the interface description a bundle's prediction server exposes:
//! one POST endpoint per signature, one request-body definition per endpoint.

use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::types::{DEFAULT_SERVING_SIGNATURE, Signature, TensorInfo, classify_dtype};

/// Generate the complete Swagger description for a set of signatures.
///
/// The default serving signature, when present, is listed first; `paths` and
/// `definitions` share that final order, with definition names assigned
/// `Type1..TypeN` by position. Any classification failure aborts the whole
/// synthesis — a partially described API is never returned.
pub fn generate_api_description(signatures: &[Signature]) -> Result<Value> {
    let ordered = serving_order(signatures);

    let mut paths = Map::new();
    let mut definitions = Map::new();
    for (index, signature) in ordered.iter().enumerate() {
        let type_name = format!("Type{}", index + 1);
        paths.insert(
            format!("/{}/predict/", signature.name),
            endpoint(&signature.name, &type_name),
        );
        definitions.insert(type_name, signature_schema(signature)?);
    }

    Ok(json!({
        "swagger": "2.0",
        "info": {
            "description": "API description for the prediction signatures of an exported model.",
            "version": "1.0.0",
            "title": "Model prediction API"
        },
        "basePath": "/",
        "schemes": ["http"],
        "paths": paths,
        "definitions": definitions
    }))
}

/// Order signatures for the document: default serving signature first, the
/// remainder in discovery order. Builds a new sequence; the input is never
/// mutated.
fn serving_order(signatures: &[Signature]) -> Vec<&Signature> {
    let (default, rest): (Vec<&Signature>, Vec<&Signature>) = signatures
        .iter()
        .partition(|s| s.name == DEFAULT_SERVING_SIGNATURE);

    if default.is_empty() && !signatures.is_empty() {
        tracing::warn!(
            signature = DEFAULT_SERVING_SIGNATURE,
            "exported model has no default serving signature; some serving platforms require one"
        );
    }

    default.into_iter().chain(rest).collect()
}

/// Endpoint descriptor for one signature's predict path.
fn endpoint(name: &str, type_name: &str) -> Value {
    json!({
        "post": {
            "summary": format!("Generate predictions using the {name} signature"),
            "description": "",
            "consumes": ["application/json"],
            "produces": ["application/json"],
            "parameters": [{
                "in": "body",
                "name": "body",
                "required": true,
                "schema": {"$ref": format!("#/definitions/{type_name}")}
            }],
            "responses": {
                "200": {"description": "Success"}
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Request-body schema
// ---------------------------------------------------------------------------

/// Request-body schema for one signature.
///
/// Every request body uses the same three-level envelope regardless of how
/// many inputs the signature declares: an object whose `instances` array
/// holds per-instance objects of named tensor schemas.
pub fn signature_schema(signature: &Signature) -> Result<Value> {
    let mut properties = Map::new();
    for (name, tensor) in &signature.inputs {
        properties.insert(name.clone(), tensor_schema(tensor)?);
    }

    Ok(json!({
        "type": "object",
        "properties": {
            "instances": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": properties
                }
            }
        }
    }))
}

/// Derive the schema for one tensor from its dtype and shape.
///
/// The terminal leaf is an object-typed schema carrying the scalar schema in
/// `items` and an `example` populated from the trailing dimension size. Each
/// dimension above the trailing one adds an array wrapper, except a dynamic
/// leading dimension: that batch axis is expressed by the outer `instances`
/// array, not by per-tensor nesting.
pub fn tensor_schema(tensor: &TensorInfo) -> Result<Value> {
    let class = classify_dtype(&tensor.dtype)?;
    let example = class.scalar.example();

    let mut schema = json!({
        "type": "object",
        "items": class.json_type(),
        "example": vec![example; tensor.trailing_size()],
    });

    let wraps = tensor
        .rank()
        .saturating_sub(1 + usize::from(tensor.is_multi_instance()));
    for _ in 0..wraps {
        schema = json!({"type": "array", "items": schema});
    }

    // Every derived schema exposes the b64 escape hatch for binary payloads.
    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "properties".into(),
            json!({"b64": {"type": "string", "example": ""}}),
        );
    }

    Ok(schema)
}
