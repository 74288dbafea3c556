use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("validation failed: {0}")]
    Validation(String),
}

impl LlmError {
    pub fn code(&self) -> &'static str {
        match self {
            LlmError::Http(_) => "LLM_HTTP",
            LlmError::Api { .. } => "LLM_API",
            LlmError::Parse(_) => "LLM_PARSE",
            LlmError::RateLimited { .. } => "LLM_RATE_LIMITED",
            LlmError::Validation(_) => "LLM_VALIDATION",
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
