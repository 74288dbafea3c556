use serde::Serialize;

/// An outbound attachment. `data` is either a blob-store key (contains a
/// `/` and no spaces) or a base64-encoded inline payload — see
/// `attachment::resolve`.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub data: String,
}

/// A single dispatcher request (spec §4.6). `interaction_token` selects the
/// follow-up-PATCH vs bot-credential-POST branch; `flags` is
/// platform-conditional (only Discord-like senders honour it).
#[derive(Debug, Clone, Default)]
pub struct OutboundMessage {
    pub channel_id: String,
    pub content: String,
    pub embeds: Option<Vec<serde_json::Value>>,
    pub components: Option<Vec<serde_json::Value>>,
    pub interaction_token: Option<String>,
    pub flags: Option<u64>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PayloadJson<'a> {
    pub content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: &'a Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: &'a Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: &'a Option<u64>,
}
