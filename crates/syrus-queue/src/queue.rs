use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::error::{QueueError, Result};
use crate::types::{Envelope, MessageGroupId};

const DEFAULT_VISIBILITY: i64 = 30; // seconds, matching a typical SQS-shaped default.

/// Stand-in for the out-of-scope durable FIFO queue substrate between
/// stages. Modeled on `skynet-scheduler::engine::SchedulerEngine`'s
/// poll-loop shape: a `tokio::select!` over a tick interval and a shutdown
/// signal drains it (see `syrus-workers::runtime`).
#[async_trait]
pub trait Queue<T: Send + Clone + 'static>: Send + Sync {
    async fn send(&self, group_id: MessageGroupId, message: T) -> Result<()>;
    /// Returns the oldest ready message from the oldest-waiting group that
    /// does not already have a message in flight. `None` if nothing is ready.
    async fn receive(&self) -> Result<Option<Envelope<T>>>;
    async fn delete(&self, receipt_handle: &str) -> Result<()>;
    async fn extend_visibility(&self, receipt_handle: &str, extra: Duration) -> Result<()>;
}

struct InFlight<T> {
    group_id: MessageGroupId,
    message: T,
    visible_at: DateTime<Utc>,
}

struct State<T> {
    ready: HashMap<MessageGroupId, VecDeque<T>>,
    group_order: VecDeque<MessageGroupId>,
    busy_groups: HashSet<MessageGroupId>,
    in_flight: HashMap<String, InFlight<T>>,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            ready: HashMap::new(),
            group_order: VecDeque::new(),
            busy_groups: HashSet::new(),
            in_flight: HashMap::new(),
        }
    }
}

/// In-process FIFO-per-group queue with a visibility-timeout layer: a
/// received message is hidden from further `receive` calls (for its own
/// group only) until `delete`d or the timeout elapses, at which point it is
/// returned to the head of its group's queue for redelivery.
pub struct InProcessQueue<T> {
    state: Mutex<State<T>>,
}

impl<T> Default for InProcessQueue<T> {
    fn default() -> Self {
        Self { state: Mutex::new(State::default()) }
    }
}

impl<T: Send + Clone + 'static> InProcessQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves any in-flight messages whose visibility timeout has elapsed
    /// back onto their group's ready queue.
    fn reclaim_expired(state: &mut State<T>) {
        let now = Utc::now();
        let expired: Vec<String> = state
            .in_flight
            .iter()
            .filter(|(_, entry)| entry.visible_at <= now)
            .map(|(handle, _)| handle.clone())
            .collect();
        for handle in expired {
            if let Some(entry) = state.in_flight.remove(&handle) {
                state.busy_groups.remove(&entry.group_id);
                let queue = state.ready.entry(entry.group_id.clone()).or_default();
                queue.push_front(entry.message);
                if !state.group_order.contains(&entry.group_id) {
                    state.group_order.push_back(entry.group_id);
                }
            }
        }
    }
}

#[async_trait]
impl<T: Send + Clone + 'static> Queue<T> for InProcessQueue<T> {
    async fn send(&self, group_id: MessageGroupId, message: T) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.ready.contains_key(&group_id) && !state.busy_groups.contains(&group_id) {
            state.group_order.push_back(group_id.clone());
        }
        state.ready.entry(group_id).or_default().push_back(message);
        Ok(())
    }

    async fn receive(&self) -> Result<Option<Envelope<T>>> {
        let mut state = self.state.lock().await;
        Self::reclaim_expired(&mut state);

        let group_count = state.group_order.len();
        for _ in 0..group_count {
            let Some(group_id) = state.group_order.pop_front() else {
                break;
            };
            if state.busy_groups.contains(&group_id) {
                // Serialize within the group: skip until the in-flight message clears.
                state.group_order.push_back(group_id);
                continue;
            }
            let Some(queue) = state.ready.get_mut(&group_id) else {
                continue;
            };
            let Some(message) = queue.pop_front() else {
                continue;
            };
            if !queue.is_empty() {
                state.group_order.push_back(group_id.clone());
            } else {
                state.ready.remove(&group_id);
            }
            let receipt_handle = Uuid::new_v4().to_string();
            state.busy_groups.insert(group_id.clone());
            debug!(group_id = %group_id, %receipt_handle, "message received from queue");

            // The in-flight table keeps its own copy so an expired visibility
            // timeout can requeue it without the caller handing it back.
            let envelope = Envelope {
                group_id: group_id.clone(),
                message: message.clone(),
                receipt_handle: receipt_handle.clone(),
            };
            state.in_flight.insert(
                receipt_handle,
                InFlight {
                    group_id,
                    message,
                    visible_at: Utc::now() + Duration::seconds(DEFAULT_VISIBILITY),
                },
            );
            return Ok(Some(envelope));
        }
        Ok(None)
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let entry = state
            .in_flight
            .remove(receipt_handle)
            .ok_or_else(|| QueueError::UnknownReceipt(receipt_handle.to_string()))?;
        state.busy_groups.remove(&entry.group_id);
        Ok(())
    }

    async fn extend_visibility(&self, receipt_handle: &str, extra: Duration) -> Result<()> {
        let mut state = self.state.lock().await;
        let entry = state
            .in_flight
            .get_mut(receipt_handle)
            .ok_or_else(|| QueueError::UnknownReceipt(receipt_handle.to_string()))?;
        entry.visible_at += extra;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_returns_messages_in_fifo_order_within_a_group() {
        let queue: InProcessQueue<u32> = InProcessQueue::new();
        let group = MessageGroupId::from("chan-1");
        queue.send(group.clone(), 1).await.unwrap();
        queue.send(group.clone(), 2).await.unwrap();
        let first = queue.receive().await.unwrap().unwrap();
        assert_eq!(first.message, 1);
        queue.delete(&first.receipt_handle).await.unwrap();
        let second = queue.receive().await.unwrap().unwrap();
        assert_eq!(second.message, 2);
    }

    #[tokio::test]
    async fn a_group_with_an_in_flight_message_is_not_redelivered() {
        let queue: InProcessQueue<u32> = InProcessQueue::new();
        let group = MessageGroupId::from("chan-1");
        queue.send(group.clone(), 1).await.unwrap();
        queue.send(group.clone(), 2).await.unwrap();
        let first = queue.receive().await.unwrap().unwrap();
        assert_eq!(first.message, 1);
        assert!(queue.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn distinct_groups_are_independent() {
        let queue: InProcessQueue<u32> = InProcessQueue::new();
        queue.send(MessageGroupId::from("a"), 10).await.unwrap();
        queue.send(MessageGroupId::from("b"), 20).await.unwrap();
        let first = queue.receive().await.unwrap().unwrap();
        let second = queue.receive().await.unwrap().unwrap();
        let mut messages = vec![first.message, second.message];
        messages.sort();
        assert_eq!(messages, vec![10, 20]);
    }

    #[tokio::test]
    async fn delete_of_unknown_receipt_errs() {
        let queue: InProcessQueue<u32> = InProcessQueue::new();
        assert!(matches!(
            queue.delete("bogus").await,
            Err(QueueError::UnknownReceipt(_))
        ));
    }

    #[tokio::test]
    async fn expired_visibility_timeout_redelivers_the_message() {
        let queue: InProcessQueue<u32> = InProcessQueue::new();
        let group = MessageGroupId::from("chan-1");
        queue.send(group.clone(), 1).await.unwrap();
        let first = queue.receive().await.unwrap().unwrap();
        {
            let mut state = queue.state.lock().await;
            let entry = state.in_flight.get_mut(&first.receipt_handle).unwrap();
            entry.visible_at = Utc::now() - Duration::seconds(1);
        }
        let redelivered = queue.receive().await.unwrap().unwrap();
        assert_eq!(redelivered.message, 1);
    }
}
