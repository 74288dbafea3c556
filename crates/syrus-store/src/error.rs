use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("campaign not found: {0}")]
    CampaignNotFound(String),

    #[error("host not found: {id}/{source}")]
    HostNotFound { id: String, source: String },

    #[error("a non-ended campaign already exists on channel {0}")]
    CampaignAlreadyActive(String),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("secret not found: {0}")]
    SecretNotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
