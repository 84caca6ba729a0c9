//! PredictService: transport-agnostic serving state.
//!
//! The service owns everything a transport needs to answer requests: the
//! parsed signatures, the API description (synthesized ONCE at construction
//! and shared immutably from then on), one compiled validator per signature,
//! the runtime handle, and shutdown coordination.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::watch;

use api_gen::error::{ApiError, Result};
use api_gen::schema::{generate_api_description, signature_schema};
use api_gen::types::Signature;

use crate::runtime::ModelRuntime;
use crate::validate::RequestValidator;
use crate::version::VersionInfo;

pub struct PredictService {
    signatures: IndexMap<String, Signature>,
    validators: IndexMap<String, RequestValidator>,
    /// The synthesized Swagger document. Immutable after construction;
    /// recomputing per request would be safe but wasteful.
    api_description: Value,
    runtime: Arc<dyn ModelRuntime>,
    version: VersionInfo,

    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl PredictService {
    /// Build a service for a set of signatures backed by `runtime`.
    ///
    /// Fails when the API description cannot be synthesized (an
    /// unclassifiable dtype, for example) — the server must never start with
    /// a partially described API.
    pub fn new(signatures: Vec<Signature>, runtime: Arc<dyn ModelRuntime>) -> Result<Self> {
        let api_description = generate_api_description(&signatures)?;

        let mut validators = IndexMap::new();
        for signature in &signatures {
            let definition = signature_schema(signature)?;
            let validator = RequestValidator::for_definition(&definition).ok_or_else(|| {
                ApiError::Other(format!(
                    "internal: definition for signature '{}' failed to compile",
                    signature.name
                ))
            })?;
            validators.insert(signature.name.clone(), validator);
        }

        let version = VersionInfo::new().with_runtime(runtime.label().to_string());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            signatures: signatures
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
            validators,
            api_description,
            runtime,
            version,
            shutdown_tx,
            shutdown_rx,
        })
    }

    pub fn api_description(&self) -> &Value {
        &self.api_description
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.signatures.get(name)
    }

    pub fn validator(&self, name: &str) -> Option<&RequestValidator> {
        self.validators.get(name)
    }

    pub fn signature_names(&self) -> Vec<String> {
        self.signatures.keys().cloned().collect()
    }

    pub fn runtime(&self) -> &Arc<dyn ModelRuntime> {
        &self.runtime
    }

    pub fn version(&self) -> &VersionInfo {
        &self.version
    }

    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Signal the server loop to begin graceful shutdown.
    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{RuntimeError, TensorBatch};
    use api_gen::types::{Dim, TensorInfo};
    use async_trait::async_trait;

    struct NullRuntime;

    #[async_trait]
    impl ModelRuntime for NullRuntime {
        async fn run(
            &self,
            _signature: &str,
            _inputs: IndexMap<String, TensorBatch>,
        ) -> std::result::Result<IndexMap<String, Value>, RuntimeError> {
            Ok(IndexMap::new())
        }

        fn label(&self) -> &str {
            "null"
        }
    }

    fn signature(name: &str, dtype: &str) -> Signature {
        let mut inputs = IndexMap::new();
        inputs.insert(
            "x".to_string(),
            TensorInfo {
                dtype: dtype.into(),
                shape: vec![Dim::Dynamic],
            },
        );
        Signature {
            name: name.into(),
            inputs,
        }
    }

    #[test]
    fn service_synthesizes_description_once() {
        let service = PredictService::new(
            vec![signature("serving_default", "float32")],
            Arc::new(NullRuntime),
        )
        .unwrap();

        assert_eq!(service.api_description()["swagger"], "2.0");
        assert!(service.signature("serving_default").is_some());
        assert!(service.validator("serving_default").is_some());
        assert_eq!(service.version().runtime.as_deref(), Some("null"));
    }

    #[test]
    fn service_refuses_unclassifiable_dtype() {
        let result = PredictService::new(
            vec![signature("serving_default", "resource")],
            Arc::new(NullRuntime),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn shutdown_signal_propagates() {
        let service =
            PredictService::new(vec![signature("serving_default", "float32")], Arc::new(NullRuntime))
                .unwrap();
        let mut rx = service.shutdown_rx();

        assert!(!*rx.borrow());
        service.trigger_shutdown();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }
}
