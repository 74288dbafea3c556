use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::error::{MessagingError, Result};
use crate::types::OutboundMessage;

/// Sole path from backend to chat platform (spec §4.6). Implementations pick
/// the follow-up-PATCH vs bot-credential-POST branch, resolve attachments,
/// and apply the 429-retry-once rule.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// Maximum characters per outbound message chunk, matching
/// `skynet-discord::send::split_chunks`'s margin below Discord's 2000-char
/// hard limit.
const CHUNK_MAX: usize = 1950;

/// Splits `text` on whitespace/newline boundaries so no chunk exceeds
/// [`CHUNK_MAX`] characters.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > CHUNK_MAX {
        let window = &remaining[..CHUNK_MAX];
        let split_at = window.rfind('\n').or_else(|| window.rfind(' ')).unwrap_or(CHUNK_MAX);
        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }

    chunks
}

/// Sends a single HTTP request built by `build`, retrying exactly once after
/// a 429 (spec §4.6: "sleep for retry_after + 0.1s, retry once. A second 429
/// fails the message").
pub async fn send_with_single_retry(
    build: impl Fn() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    let resp = build().send().await?;
    if resp.status().as_u16() != 429 {
        return check_status(resp).await;
    }

    let retry_after = retry_after_seconds(&resp);
    warn!(retry_after, "messaging dispatcher hit 429, retrying once");
    tokio::time::sleep(Duration::from_secs_f64(retry_after + 0.1)).await;

    let resp = build().send().await?;
    if resp.status().as_u16() == 429 {
        return Err(MessagingError::RateLimitExceeded);
    }
    check_status(resp).await
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status().as_u16();
        let message = resp.text().await.unwrap_or_default();
        Err(MessagingError::Api { status, message })
    }
}

fn retry_after_seconds(resp: &reqwest::Response) -> f64 {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        assert_eq!(split_chunks("hello").len(), 1);
    }

    #[test]
    fn long_text_splits_below_chunk_max() {
        let line = "a".repeat(1200);
        let text = format!("{line}\n{line}");
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
    }
}
