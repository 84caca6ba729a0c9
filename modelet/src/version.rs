//! Version information for modelet.

/// Modelet version from Cargo.toml
pub const MODELET_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version information surfaced by the health-check endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct VersionInfo {
    /// Modelet serving-layer version.
    pub modelet: &'static str,
    /// Label of the model runtime backing the server (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            modelet: MODELET_VERSION,
            runtime: None,
        }
    }
}

impl VersionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runtime(mut self, label: String) -> Self {
        self.runtime = Some(label);
        self
    }
}
