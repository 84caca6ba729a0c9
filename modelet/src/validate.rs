//! Request validation against the synthesized API description.
//!
//! The derived per-tensor schemas in the Swagger document describe
//! documentation shape (examples, the b64 escape hatch), not strict value
//! types, so the compiled validator enforces the envelope contract instead:
//! a required `instances` array of objects, each carrying exactly the
//! declared inputs.

use serde_json::{Map, Value, json};

/// A single validation error for one field.
#[derive(Debug)]
pub struct ValidationError {
    /// Field location (used as loc[1] in the error response).
    pub field: String,
    /// Human-readable error message.
    pub msg: String,
    /// Error type string (e.g. "value_error.missing").
    pub error_type: String,
}

/// Compiled request validator for one signature.
pub struct RequestValidator {
    validator: jsonschema::Validator,
    /// Input names declared by the signature, in schema order.
    inputs: Vec<String>,
}

impl RequestValidator {
    /// Build a validator from a signature's synthesized request-body
    /// definition (the `Type<N>` entry of the API description).
    ///
    /// Returns None when the definition lacks the instances envelope or the
    /// derived validation schema fails to compile.
    pub fn for_definition(definition: &Value) -> Option<Self> {
        let inputs: Vec<String> = definition
            .get("properties")?
            .get("instances")?
            .get("items")?
            .get("properties")?
            .as_object()?
            .keys()
            .cloned()
            .collect();

        // Per-input value shapes are checked during tensor conversion; here
        // each declared input just has to be present.
        let mut instance_properties = Map::new();
        for name in &inputs {
            instance_properties.insert(name.clone(), json!({}));
        }

        let strict = json!({
            "type": "object",
            "required": ["instances"],
            "additionalProperties": false,
            "properties": {
                "instances": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": &inputs,
                        "additionalProperties": false,
                        "properties": instance_properties
                    }
                }
            }
        });

        let validator = jsonschema::validator_for(&strict)
            .inspect_err(|e| {
                tracing::warn!(error = %e, "Failed to compile request validator");
            })
            .ok()?;

        Some(Self { validator, inputs })
    }

    /// Validate a request body against the envelope contract.
    ///
    /// Returns Ok(()) on success, or per-field errors formatted for the 422
    /// `detail` response.
    pub fn validate(&self, body: &Value) -> Result<(), Vec<ValidationError>> {
        if self.validator.validate(body).is_ok() {
            return Ok(());
        }

        let mut errors = Vec::new();

        let instances = match body.get("instances") {
            Some(v) => v,
            None => {
                errors.push(ValidationError {
                    field: "instances".to_string(),
                    msg: "field required".to_string(),
                    error_type: "value_error.missing".to_string(),
                });
                return Err(errors);
            }
        };

        let rows = match instances.as_array() {
            Some(rows) => rows,
            None => {
                errors.push(ValidationError {
                    field: "instances".to_string(),
                    msg: "value is not a valid list".to_string(),
                    error_type: "type_error.list".to_string(),
                });
                return Err(errors);
            }
        };

        if let Some(obj) = body.as_object() {
            for key in obj.keys().filter(|k| *k != "instances") {
                errors.push(ValidationError {
                    field: key.clone(),
                    msg: "extra fields not permitted".to_string(),
                    error_type: "value_error.extra".to_string(),
                });
            }
        }

        for (index, row) in rows.iter().enumerate() {
            let Some(fields) = row.as_object() else {
                errors.push(ValidationError {
                    field: format!("instances[{index}]"),
                    msg: "value is not a valid dict".to_string(),
                    error_type: "type_error.dict".to_string(),
                });
                continue;
            };

            for name in &self.inputs {
                if !fields.contains_key(name) {
                    errors.push(ValidationError {
                        field: format!("instances[{index}].{name}"),
                        msg: "field required".to_string(),
                        error_type: "value_error.missing".to_string(),
                    });
                }
            }
            for key in fields.keys() {
                if !self.inputs.iter().any(|name| name == key) {
                    errors.push(ValidationError {
                        field: format!("instances[{index}].{key}"),
                        msg: "extra fields not permitted".to_string(),
                        error_type: "value_error.extra".to_string(),
                    });
                }
            }
        }

        if errors.is_empty() {
            // The validator rejected the body for a reason the manual walk
            // above didn't reproduce; report it generically rather than
            // accepting a body the schema refused.
            errors.push(ValidationError {
                field: "body".to_string(),
                msg: "request body does not match the signature schema".to_string(),
                error_type: "value_error".to_string(),
            });
        }

        Err(errors)
    }
}
