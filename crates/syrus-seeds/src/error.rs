use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("no corpus profile configured for campaign type {0}")]
    MissingProfile(String),

    #[error("selection step failed: {0}")]
    SelectionFailed(String),
}

impl SeedError {
    pub fn code(&self) -> &'static str {
        match self {
            SeedError::MissingProfile(_) => "SEED_MISSING_PROFILE",
            SeedError::SelectionFailed(_) => "SEED_SELECTION_FAILED",
        }
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;
