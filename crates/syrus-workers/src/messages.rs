//! Queue message schemas (spec.md §6). These are the payloads carried
//! between stages; the `MessageGroupId` each is enqueued under is always
//! the campaign id (or, for the `ConfiguringMessage` `start` path, the
//! channel id that will become the campaign id).
//!
//! Lives here rather than in `syrus-core` because `BlueprintMessage` embeds
//! `syrus_seeds::SeedPackage`, and `syrus-seeds` itself depends on
//! `syrus-core` — putting the schemas one level up avoids the cycle.

use serde::{Deserialize, Serialize};

use syrus_core::types::{CampaignId, ChatSource, CommandOption, ModelClass};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguringMessage {
    pub channel_id: String,
    pub host_id: String,
    pub interaction_id: String,
    pub interaction_token: Option<String>,
    pub source: ChatSource,
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthingMessage {
    pub campaign_id: CampaignId,
    pub interaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintMessage {
    pub campaign_id: CampaignId,
    pub interaction_id: String,
    pub seeds: syrus_seeds::SeedPackage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenMessage {
    pub campaign_id: CampaignId,
    pub interaction_id: String,
    pub image_id: String,
    pub prompt: String,
    pub model: ModelClass,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayMessage {
    pub campaign_id: CampaignId,
    pub interaction_id: String,
    pub interaction_token: Option<String>,
    pub options: Vec<CommandOption>,
}
