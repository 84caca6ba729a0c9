use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unrecognized tensor dtype: {0}")]
    UnknownDType(String),

    #[error("failed to parse signature manifest: {0}")]
    ManifestParse(String),

    #[error("manifest not found: {0}")]
    ManifestNotFound(String),

    #[error("signature '{0}' declares no inputs")]
    EmptySignature(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;
