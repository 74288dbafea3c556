use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::attachment;
use crate::error::Result;
use crate::sender::{send_with_single_retry, split_chunks, ChannelSender};
use crate::types::{OutboundMessage, PayloadJson};
use syrus_store::{BlobStore, SecretStore};

/// Discord-like dispatcher branch: PATCH follow-up (token-only auth, no
/// Bearer header) when an interaction token is present, else a bot-credential
/// POST to the channel endpoint. Grounded on `skynet-discord::send`'s
/// chunking/sending shape, generalized to the two-branch auth rule.
pub struct DiscordLikeSender {
    client: reqwest::Client,
    secrets: Arc<dyn SecretStore>,
    blobs: Arc<dyn BlobStore>,
    base_url: String,
    app_id: String,
}

impl DiscordLikeSender {
    pub fn new(secrets: Arc<dyn SecretStore>, blobs: Arc<dyn BlobStore>, app_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secrets,
            blobs,
            base_url: "https://discord.com/api/v10".to_string(),
            app_id,
        }
    }
}

#[async_trait]
impl ChannelSender for DiscordLikeSender {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let resolved: Vec<(String, Vec<u8>)> = message
            .attachments
            .iter()
            .map(|a| Ok((a.filename.clone(), attachment::resolve(a, self.blobs.as_ref())?)))
            .collect::<Result<_>>()?;
        let has_attachments = !resolved.is_empty();
        let timeout = if has_attachments { Duration::from_secs(30) } else { Duration::from_secs(10) };

        let bot_token = match &message.interaction_token {
            Some(_) => None,
            None => Some(self.secrets.get("discord_bot_token")?),
        };

        // Only the first chunk carries embeds/components/flags/attachments;
        // overflow chunks are plain follow-up text, matching
        // `skynet-discord::send::send_chunked`'s one-chunk-per-message loop.
        let chunks = split_chunks(&message.content);
        let no_embeds: Option<Vec<serde_json::Value>> = None;
        let no_components: Option<Vec<serde_json::Value>> = None;
        for (i, chunk) in chunks.iter().enumerate() {
            let is_first = i == 0;
            let build = || {
                let payload = PayloadJson {
                    content: chunk,
                    embeds: if is_first { &message.embeds } else { &no_embeds },
                    components: if is_first { &message.components } else { &no_components },
                    flags: &message.flags,
                };
                let payload_str = serde_json::to_string(&payload).expect("payload json never fails to serialize");

                let (method, url) = match &message.interaction_token {
                    Some(token) if is_first => (
                        reqwest::Method::PATCH,
                        format!("{}/webhooks/{}/{}/messages/@original", self.base_url, self.app_id, token),
                    ),
                    Some(token) => (reqwest::Method::POST, format!("{}/webhooks/{}/{}", self.base_url, self.app_id, token)),
                    None => (reqwest::Method::POST, format!("{}/channels/{}/messages", self.base_url, message.channel_id)),
                };

                let mut builder = self.client.request(method, &url).timeout(timeout);
                if let Some(token) = &bot_token {
                    builder = builder.header("Authorization", format!("Bot {token}"));
                }

                if is_first && has_attachments {
                    let mut form = reqwest::multipart::Form::new().text("payload_json", payload_str.clone());
                    for (i, (filename, bytes)) in resolved.iter().enumerate() {
                        let part = reqwest::multipart::Part::bytes(bytes.clone()).file_name(filename.clone());
                        form = form.part(format!("files[{i}]"), part);
                    }
                    builder.multipart(form)
                } else {
                    builder.header("content-type", "application/json").body(payload_str)
                }
            };

            send_with_single_retry(build).await?;
        }
        Ok(())
    }
}
