use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no receipt handle {0} is currently in flight")]
    UnknownReceipt(String),
}

impl QueueError {
    pub fn code(&self) -> &'static str {
        match self {
            QueueError::UnknownReceipt(_) => "QUEUE_UNKNOWN_RECEIPT",
        }
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
