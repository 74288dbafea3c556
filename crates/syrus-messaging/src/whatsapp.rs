use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::attachment;
use crate::error::Result;
use crate::sender::{send_with_single_retry, split_chunks, ChannelSender};
use crate::types::OutboundMessage;
use syrus_store::{BlobStore, SecretStore};

/// WhatsApp-like dispatcher branch: a single bot-token POST per message, no
/// follow-up/interaction-token concept and no `flags` (platform-conditional
/// per spec §4.6). Grounded on `skynet-telegram::send`'s plain bot-credential
/// POST shape.
pub struct WhatsAppLikeSender {
    client: reqwest::Client,
    secrets: Arc<dyn SecretStore>,
    blobs: Arc<dyn BlobStore>,
    base_url: String,
    phone_number_id: String,
}

impl WhatsAppLikeSender {
    pub fn new(secrets: Arc<dyn SecretStore>, blobs: Arc<dyn BlobStore>, phone_number_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secrets,
            blobs,
            base_url: "https://graph.facebook.com/v19.0".to_string(),
            phone_number_id,
        }
    }
}

#[derive(Serialize)]
struct TextPayload<'a> {
    messaging_product: &'a str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    text: TextBody<'a>,
}

#[derive(Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct ImagePayload<'a> {
    messaging_product: &'a str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    image: ImageBody<'a>,
}

#[derive(Serialize)]
struct ImageBody<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

#[derive(serde::Deserialize)]
struct MediaUploadResponse {
    id: String,
}

#[async_trait]
impl ChannelSender for WhatsAppLikeSender {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let bot_token = self.secrets.get("whatsapp_bot_token")?;
        let messages_url = format!("{}/{}/messages", self.base_url, self.phone_number_id);

        let resolved: Vec<(String, Vec<u8>)> = message
            .attachments
            .iter()
            .map(|a| Ok((a.filename.clone(), attachment::resolve(a, self.blobs.as_ref())?)))
            .collect::<Result<_>>()?;

        if resolved.is_empty() {
            for chunk in split_chunks(&message.content) {
                let build = || {
                    let payload = TextPayload {
                        messaging_product: "whatsapp",
                        to: &message.channel_id,
                        kind: "text",
                        text: TextBody { body: &chunk },
                    };
                    self.client
                        .post(&messages_url)
                        .timeout(Duration::from_secs(10))
                        .header("Authorization", format!("Bearer {bot_token}"))
                        .json(&payload)
                };
                send_with_single_retry(build).await?;
            }
            return Ok(());
        }

        let media_url = format!("{}/{}/media", self.base_url, self.phone_number_id);
        for (filename, bytes) in &resolved {
            let media_id = {
                let build = || {
                    let form = reqwest::multipart::Form::new()
                        .text("messaging_product", "whatsapp")
                        .part("file", reqwest::multipart::Part::bytes(bytes.clone()).file_name(filename.clone()));
                    self.client
                        .post(&media_url)
                        .timeout(Duration::from_secs(30))
                        .header("Authorization", format!("Bearer {bot_token}"))
                        .multipart(form)
                };
                let resp = send_with_single_retry(build).await?;
                resp.json::<MediaUploadResponse>().await.map_err(crate::error::MessagingError::Http)?.id
            };

            let build = || {
                let payload = ImagePayload {
                    messaging_product: "whatsapp",
                    to: &message.channel_id,
                    kind: "image",
                    image: ImageBody { id: &media_id, caption: Some(&message.content) },
                };
                self.client
                    .post(&messages_url)
                    .timeout(Duration::from_secs(10))
                    .header("Authorization", format!("Bearer {bot_token}"))
                    .json(&payload)
            };
            send_with_single_retry(build).await?;
        }

        Ok(())
    }
}
