//! Signature metadata types and the dtype classification table.
//!
//! Everything here is read-only input to the generator: signatures and tensor
//! info come straight from an exported bundle's metadata and are never
//! mutated during synthesis.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, Result};

/// Signature name that serving platforms expect an exported bundle to carry.
pub const DEFAULT_SERVING_SIGNATURE: &str = "serving_default";

// ---------------------------------------------------------------------------
// Scalar types
// ---------------------------------------------------------------------------

/// Schema primitive a tensor element type maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Integer,
    Number,
    String,
    Boolean,
}

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// Canonical example value for a scalar of this type.
    pub fn example(self) -> Value {
        match self {
            Self::Integer => json!(0.0),
            Self::Number => json!(0.0),
            Self::String => json!("ABC"),
            Self::Boolean => json!(true),
        }
    }
}

// ---------------------------------------------------------------------------
// DType classification
// ---------------------------------------------------------------------------

/// Classified element type: schema primitive plus wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DTypeClass {
    pub scalar: ScalarType,
    /// Swagger `format` qualifier; empty when the family has none.
    pub format: &'static str,
}

impl DTypeClass {
    /// JSON Schema fragment for this element type.
    /// `format` is omitted when the classification rule carries none.
    pub fn json_type(&self) -> Value {
        if self.format.is_empty() {
            json!({"type": self.scalar.as_str()})
        } else {
            json!({"type": self.scalar.as_str(), "format": self.format})
        }
    }
}

/// Ordered substring rules for classifying dtype names, most specific first.
///
/// Order is load-bearing: patterns are not mutually exclusive ("int32"
/// contains "int"), so the table must stay sorted specific-before-general.
const DTYPE_RULES: &[(&str, ScalarType, &str)] = &[
    ("int32", ScalarType::Integer, "int32"),
    ("int64", ScalarType::Integer, "int64"),
    ("int", ScalarType::Integer, ""),
    ("float", ScalarType::Number, "float"),
    ("complex", ScalarType::Number, ""),
    ("string", ScalarType::String, ""),
    ("bool", ScalarType::Boolean, ""),
];

/// Classify a tensor element-type name against the rule table.
///
/// Matching is case-insensitive substring search; the first matching rule
/// wins. An unmatched name is a fatal configuration error — the bundle
/// exposes an element type this generator does not understand.
pub fn classify_dtype(dtype: &str) -> Result<DTypeClass> {
    let lowered = dtype.to_ascii_lowercase();
    DTYPE_RULES
        .iter()
        .find(|(pattern, _, _)| lowered.contains(pattern))
        .map(|&(_, scalar, format)| DTypeClass { scalar, format })
        .ok_or_else(|| ApiError::UnknownDType(dtype.to_string()))
}

// ---------------------------------------------------------------------------
// Tensor metadata
// ---------------------------------------------------------------------------

/// One declared dimension of a tensor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    /// Size determined at call time, conventionally the batch axis.
    Dynamic,
    Fixed(u64),
}

impl<'de> Deserialize<'de> for Dim {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Exported manifests mark a dynamic dimension as -1 or null.
        let raw = Option::<i64>::deserialize(deserializer)?;
        match raw {
            None => Ok(Dim::Dynamic),
            Some(n) if n < 0 => Ok(Dim::Dynamic),
            Some(n) => Ok(Dim::Fixed(n as u64)),
        }
    }
}

/// Element type and shape metadata for one named tensor.
#[derive(Debug, Clone, Deserialize)]
pub struct TensorInfo {
    pub dtype: String,
    #[serde(default)]
    pub shape: Vec<Dim>,
}

impl TensorInfo {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// A tensor whose leading dimension is dynamic already carries a
    /// variable-size batch of rows; only position 0 gets this treatment.
    pub fn is_multi_instance(&self) -> bool {
        matches!(self.shape.first(), Some(Dim::Dynamic))
    }

    /// Size of the innermost dimension, defaulting to 1 when the tensor is a
    /// scalar or the trailing dimension is dynamic.
    pub fn trailing_size(&self) -> usize {
        match self.shape.last() {
            Some(Dim::Fixed(n)) => (*n).max(1) as usize,
            _ => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// A named callable entry point of an exported model, with its input tensors
/// in declaration order.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub inputs: IndexMap<String, TensorInfo>,
}
