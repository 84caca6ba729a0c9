//! Model runtime boundary.
//!
//! The serving layer never executes tensors itself; it hands batched inputs
//! to whatever runtime backs the exported bundle and gets output tensors
//! back. Everything behind this trait is an external collaborator.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

/// Batched values for one named input tensor, one row per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorBatch {
    /// Element-type name as declared by the bundle (e.g. "float32").
    pub dtype: String,
    pub rows: Vec<TensorValue>,
}

/// One instance's worth of data for a tensor.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    /// Plain JSON value: number, string, bool, or nested array.
    Json(Value),
    /// Raw bytes decoded from a `{"b64": …}` field.
    Bytes(Vec<u8>),
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("model execution failed: {0}")]
    Execution(String),

    #[error("runtime does not expose signature '{0}'")]
    UnknownSignature(String),
}

/// Capability the serving layer needs from a model runtime: given input
/// tensors, produce output tensors.
#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Run one batched invocation of the named signature.
    async fn run(
        &self,
        signature: &str,
        inputs: IndexMap<String, TensorBatch>,
    ) -> Result<IndexMap<String, Value>, RuntimeError>;

    /// Short backend label for health reporting.
    fn label(&self) -> &str {
        "unknown"
    }
}
