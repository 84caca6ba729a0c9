//! modelet: lightweight prediction server for exported model bundles.

pub mod instances;
pub mod runtime;
pub mod service;
pub mod transport;
pub mod validate;
mod version;

pub use instances::{ConvertError, instances_to_batches};
pub use runtime::{ModelRuntime, RuntimeError, TensorBatch, TensorValue};
pub use service::PredictService;
pub use transport::{ServerConfig, serve};
pub use validate::{RequestValidator, ValidationError};
pub use version::{MODELET_VERSION, VersionInfo};

/// Install a global tracing subscriber honoring `RUST_LOG`.
///
/// Convenience for embedders and binaries; libraries should not call this.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
