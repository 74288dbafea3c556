use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyrusError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl SyrusError {
    /// Short error code, used in structured log fields and test assertions.
    pub fn code(&self) -> &'static str {
        match self {
            SyrusError::Config(_) => "CONFIG_ERROR",
            SyrusError::AuthFailed(_) => "AUTH_FAILED",
            SyrusError::Validation(_) => "VALIDATION_ERROR",
            SyrusError::NotFound(_) => "NOT_FOUND",
            SyrusError::Serialization(_) => "SERIALIZATION_ERROR",
            SyrusError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyrusError>;
