use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use syrus_queue::{Envelope, Queue, StageAction};

use crate::error::WorkerOutcome;

/// Default poll cadence for every stage loop — matches the in-process
/// queue's redelivery granularity closely enough that a crashed worker's
/// in-flight message is retried promptly.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Thin wrapper over `syrus_queue::run_stage` that turns a stage's
/// `WorkerOutcome` into the harness's ack/redeliver decision — the one
/// place every stage worker's retry policy funnels through (spec §4.2's
/// "swallow after message sent, surface before" contract, shared by all
/// four stages).
pub async fn run_stage<T, F, Fut>(
    queue: Arc<dyn Queue<T>>,
    shutdown: watch::Receiver<bool>,
    process: F,
) where
    T: Send + Clone + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = WorkerOutcome> + Send,
{
    syrus_queue::run_stage(queue, DEFAULT_POLL_INTERVAL, shutdown, move |envelope: Envelope<T>| {
        let fut = process(envelope.message);
        async move {
            match fut.await {
                WorkerOutcome::Success => StageAction::Ack,
                WorkerOutcome::Retry(e) => {
                    warn!(error = %e, code = e.code(), "stage processing failed, leaving for redelivery");
                    StageAction::Redeliver
                }
            }
        }
    })
    .await
}
