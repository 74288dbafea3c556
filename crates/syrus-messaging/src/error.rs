use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited twice in a row, giving up")]
    RateLimitExceeded,

    #[error("secret store error: {0}")]
    Secret(#[from] syrus_store::StoreError),

    #[error("attachment {0} referenced a missing blob")]
    MissingAttachment(String),
}

impl MessagingError {
    pub fn code(&self) -> &'static str {
        match self {
            MessagingError::Http(_) => "MESSAGING_HTTP",
            MessagingError::Api { .. } => "MESSAGING_API",
            MessagingError::RateLimitExceeded => "MESSAGING_RATE_LIMIT_EXCEEDED",
            MessagingError::Secret(_) => "MESSAGING_SECRET",
            MessagingError::MissingAttachment(_) => "MESSAGING_MISSING_ATTACHMENT",
        }
    }
}

pub type Result<T> = std::result::Result<T, MessagingError>;
