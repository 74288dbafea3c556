use std::fmt;

/// Groups messages that must be delivered in strict FIFO order relative to
/// one another (spec §5: "a single campaignId group serializes turns").
/// Distinct groups may be delivered concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageGroupId(pub String);

impl fmt::Display for MessageGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageGroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageGroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A message handed back by `Queue::receive`, carrying the receipt handle
/// needed to `delete` or `extend_visibility` it.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub group_id: MessageGroupId,
    pub message: T,
    pub receipt_handle: String,
}
