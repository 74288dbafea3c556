use thiserror::Error;

/// Unifies every collaborator error a stage worker can hit. Kept as a plain
/// enum of `#[from]` wrappers rather than a generic framework, matching
/// `SkynetError`'s directness.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("store error: {0}")]
    Store(#[from] syrus_store::StoreError),

    #[error("queue error: {0}")]
    Queue(#[from] syrus_queue::QueueError),

    #[error("seed selection error: {0}")]
    Seed(#[from] syrus_seeds::SeedError),

    #[error("llm error: {0}")]
    Llm(#[from] syrus_llm::LlmError),

    #[error("messaging error: {0}")]
    Messaging(#[from] syrus_messaging::MessagingError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("timed out: {0}")]
    Timeout(String),
}

impl WorkerError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::Store(_) => "WORKER_STORE",
            WorkerError::Queue(_) => "WORKER_QUEUE",
            WorkerError::Seed(_) => "WORKER_SEED",
            WorkerError::Llm(_) => "WORKER_LLM",
            WorkerError::Messaging(_) => "WORKER_MESSAGING",
            WorkerError::Validation(_) => "WORKER_VALIDATION",
            WorkerError::Timeout(_) => "WORKER_TIMEOUT",
        }
    }
}

/// What a stage worker's `process()` function tells the pipeline harness to
/// do with the queue message (spec §7/§9 "retry vs user-visibility coupling").
#[derive(Debug)]
pub enum WorkerOutcome {
    /// Ack the message: either it fully succeeded, or a user-visible
    /// narrative error/already-processed result was produced and returning
    /// success prevents retry amplification.
    Success,
    /// Let the message redeliver — an infrastructure failure occurred
    /// before any user-visible message was sent.
    Retry(WorkerError),
}

/// Baseline retryability of an error kind, ignoring whether a user message
/// has already been sent (spec §7's error-kind table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Swallow,
    Retry,
}

pub fn classify(err: &WorkerError) -> ErrorPolicy {
    match err {
        WorkerError::Store(_) => ErrorPolicy::Retry,
        WorkerError::Queue(_) => ErrorPolicy::Retry,
        WorkerError::Llm(syrus_llm::LlmError::RateLimited { .. }) => ErrorPolicy::Retry,
        WorkerError::Llm(_) => ErrorPolicy::Swallow,
        WorkerError::Messaging(_) => ErrorPolicy::Retry,
        WorkerError::Seed(_) => ErrorPolicy::Swallow,
        WorkerError::Validation(_) => ErrorPolicy::Swallow,
        WorkerError::Timeout(_) => ErrorPolicy::Retry,
    }
}

/// Collapses an error into the outcome a `process()` function should return,
/// given whether a user-visible message has already gone out on this attempt.
/// Once `message_sent` is true, the contract is "always return Success"
/// regardless of the error's own retryability (spec §9).
pub fn outcome_for(err: WorkerError, message_sent: bool) -> WorkerOutcome {
    if message_sent {
        return WorkerOutcome::Success;
    }
    match classify(&err) {
        ErrorPolicy::Retry => WorkerOutcome::Retry(err),
        ErrorPolicy::Swallow => WorkerOutcome::Success,
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_sent_always_yields_success_even_for_retryable_errors() {
        let err = WorkerError::Store(syrus_store::StoreError::CampaignNotFound("x".into()));
        assert!(matches!(outcome_for(err, true), WorkerOutcome::Success));
    }

    #[test]
    fn store_error_before_message_is_retryable() {
        let err = WorkerError::Store(syrus_store::StoreError::CampaignNotFound("x".into()));
        assert!(matches!(outcome_for(err, false), WorkerOutcome::Retry(_)));
    }

    #[test]
    fn validation_error_before_message_is_swallowed() {
        let err = WorkerError::Validation("bad campaign type".into());
        assert!(matches!(outcome_for(err, false), WorkerOutcome::Success));
    }
}
