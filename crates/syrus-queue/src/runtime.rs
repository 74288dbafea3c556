use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::queue::Queue;
use crate::types::Envelope;

/// What a stage handler tells the harness to do with a received message.
/// Deliberately has no explicit "nack" — not deleting leaves the message
/// in-flight until its visibility timeout lapses, at which point
/// `Queue::receive` redelivers it, the same way SQS's own visibility
/// timeout drives redelivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    Ack,
    Redeliver,
}

/// Polls `queue` on an interval until `shutdown` broadcasts `true`, handing
/// each received envelope to `handler` and acking on [`StageAction::Ack`].
/// Mirrors `SchedulerEngine::run`'s `tokio::select!` over `interval.tick()` /
/// `shutdown.changed()`.
pub async fn run_stage<T, F, Fut>(
    queue: Arc<dyn Queue<T>>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    handler: F,
) where
    T: Send + Clone + 'static,
    F: Fn(Envelope<T>) -> Fut + Send + Sync,
    Fut: Future<Output = StageAction> + Send,
{
    let mut interval = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match queue.receive().await {
                    Ok(Some(envelope)) => {
                        let receipt_handle = envelope.receipt_handle.clone();
                        if handler(envelope).await == StageAction::Ack {
                            if let Err(e) = queue.delete(&receipt_handle).await {
                                error!(error = %e, "failed to delete acked message");
                            }
                        } else {
                            debug!(%receipt_handle, "handler requested redelivery");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => error!(error = %e, "queue receive failed"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    debug!("stage runtime shutting down");
                    break;
                }
            }
        }
    }
}
