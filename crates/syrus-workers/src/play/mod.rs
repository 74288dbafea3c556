//! Play Worker (spec §4.5): accepts a player's declared action, validates
//! campaign/act state, and narrates a reply scoped to the current act's
//! primary area. Full turn resolution via an LLM is a defined extension
//! point (`play::haiku::HaikuResponse`), not mandated by the core contract.

use tracing::warn;

use syrus_core::types::{CommandOption, Stage};
use syrus_messaging::{ChannelSender, OutboundMessage};
use syrus_store::model::{ActMemory, Campaign, CampaignStatus};
use syrus_store::{load_or_not_found, CampaignStore, DedupStore};

use crate::error::{outcome_for, WorkerError, WorkerOutcome};
use crate::messages::PlayMessage;
use crate::narrative;

pub mod haiku;

pub async fn process(
    msg: PlayMessage,
    campaigns: &dyn CampaignStore,
    dedup: &dyn DedupStore,
    sender: &dyn ChannelSender,
) -> WorkerOutcome {
    match dedup.seen(Stage::Play, &msg.interaction_id, None) {
        Ok(true) => return WorkerOutcome::Success,
        Ok(false) => {}
        Err(e) => warn!(error = %e, "dedup read failed, proceeding as unseen"),
    }

    let mut campaign = match load_or_not_found(campaigns, &msg.campaign_id) {
        Ok(c) => c,
        Err(e) => return outcome_for(WorkerError::from(e), false),
    };

    if matches!(campaign.status, CampaignStatus::Ended | CampaignStatus::Configuring) {
        let text = narrative::play_campaign_not_active(status_label(campaign.status));
        return match reply(sender, &msg, &campaign, &text).await {
            Ok(()) => WorkerOutcome::Success,
            Err(e) => outcome_for(e, false),
        };
    }
    if campaign.lifecycle.paused {
        return match reply(sender, &msg, &campaign, narrative::play_campaign_paused()).await {
            Ok(()) => WorkerOutcome::Success,
            Err(e) => outcome_for(e, false),
        };
    }

    let Some(declare) = CommandOption::find(&msg.options, "declare").and_then(|o| o.opt("text")).and_then(|o| o.as_str()) else {
        return match reply(sender, &msg, &campaign, narrative::play_missing_declare()).await {
            Ok(()) => WorkerOutcome::Success,
            Err(e) => outcome_for(e, false),
        };
    };

    let Some(blueprint) = campaign.blueprint.as_ref() else {
        // status=active implies a blueprint exists; a campaign reaching
        // here without one is a data inconsistency, not a user error.
        return outcome_for(WorkerError::Validation("active campaign has no blueprint".into()), false);
    };
    let current_act = campaign.runtime.current_act as usize;
    let Some(act) = blueprint.acts.get(current_act) else {
        return outcome_for(
            WorkerError::Validation(format!("currentAct {current_act} out of range (0..{})", blueprint.acts.len())),
            false,
        );
    };
    let primary_area = act.primary_area.clone();
    let reply_text = narrative::play_turn_reply(&primary_area, declare);

    campaign
        .memory
        .acts
        .entry(campaign.runtime.current_act.to_string())
        .or_insert_with(ActMemory::default);

    if let Err(e) = campaigns.put(&campaign) {
        return outcome_for(WorkerError::from(e), false);
    }

    if let Err(e) = reply(sender, &msg, &campaign, &reply_text).await {
        return outcome_for(e, false);
    }

    if let Err(e) = dedup.record(Stage::Play, &msg.interaction_id, None) {
        warn!(error = %e, "dedup write failed after successful play turn");
    }

    WorkerOutcome::Success
}

fn status_label(status: CampaignStatus) -> &'static str {
    match status {
        CampaignStatus::Configuring => "configuring",
        CampaignStatus::Active => "active",
        CampaignStatus::Playing => "playing",
        CampaignStatus::Paused => "paused",
        CampaignStatus::Ended => "ended",
    }
}

async fn reply(sender: &dyn ChannelSender, msg: &PlayMessage, campaign: &Campaign, content: &str) -> Result<(), WorkerError> {
    sender
        .send(&OutboundMessage {
            channel_id: campaign.meta.channel_id.clone(),
            content: content.to_string(),
            interaction_token: msg.interaction_token.clone(),
            ..Default::default()
        })
        .await
        .map_err(WorkerError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rusqlite::Connection;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use syrus_core::types::{CampaignId, CampaignType, ChatSource, DecisionModel, OptionValue};
    use syrus_store::model::{ActStructure, Blueprint, EndStates, IngredientBinding};
    use syrus_store::{SqliteCampaignStore, SqliteDedupStore};

    struct RecordingSender {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self { sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl ChannelSender for RecordingSender {
        async fn send(&self, message: &OutboundMessage) -> syrus_messaging::Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn sample_blueprint() -> Blueprint {
        Blueprint {
            title: "The Sundered Vault".into(),
            premise: "A premise".into(),
            thematic_pillars: vec!["a".into(), "b".into(), "c".into()],
            ingredient_binding: IngredientBinding {
                objective_id: "obj-1".into(),
                antagonist_ids: vec![],
                twist_ids: vec![],
                set_piece_ids: vec![],
                constraint_ids: vec![],
                map_id: "map-1".into(),
            },
            acts: vec![
                ActStructure { act_number: 1, beats: vec!["arrival".into()], primary_area: "vault-entry".into() },
                ActStructure { act_number: 2, beats: vec!["resolution".into()], primary_area: "vault-core".into() },
            ],
            major_forces: vec![],
            npcs: HashMap::new(),
            boon_plan: vec![],
            failure_paths: vec![],
            end_states: EndStates { success: "s".into(), compromised: "c".into(), failure: "f".into() },
            memory_directives: vec![],
            image_plan: HashMap::new(),
        }
    }

    fn active_campaign(campaigns: &SqliteCampaignStore) -> CampaignId {
        let mut campaign = Campaign::new_configuring(
            CampaignId::from("chan-1"),
            CampaignType::Short,
            DecisionModel::Host,
            "host-1",
            ChatSource::Discord,
            "chan-1",
        );
        campaign.status = CampaignStatus::Active;
        campaign.blueprint = Some(sample_blueprint());
        campaigns.put(&campaign).unwrap();
        campaign.campaign_id
    }

    fn declare_options(text: &str) -> Vec<CommandOption> {
        vec![CommandOption {
            name: "declare".to_string(),
            value: OptionValue::Sequence(vec![CommandOption {
                name: "text".to_string(),
                value: OptionValue::Scalar(serde_json::json!(text)),
            }]),
        }]
    }

    #[tokio::test]
    async fn declares_action_and_narrates_the_current_act_area() {
        let campaigns = SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let dedup = SqliteDedupStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let sender = RecordingSender::new();
        let campaign_id = active_campaign(&campaigns);

        let outcome = process(
            PlayMessage {
                campaign_id: campaign_id.clone(),
                interaction_id: "int-1".into(),
                interaction_token: None,
                options: declare_options("search the entry hall"),
            },
            &campaigns,
            &dedup,
            &sender,
        )
        .await;
        assert!(matches!(outcome, WorkerOutcome::Success));

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].content.contains("vault-entry"));

        let campaign = campaigns.get(&campaign_id).unwrap().unwrap();
        assert!(campaign.memory.acts.contains_key("0"));
    }

    #[tokio::test]
    async fn rejects_declare_on_ended_campaign() {
        let campaigns = SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let dedup = SqliteDedupStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let sender = RecordingSender::new();
        let campaign_id = active_campaign(&campaigns);
        let mut campaign = campaigns.get(&campaign_id).unwrap().unwrap();
        campaign.status = CampaignStatus::Ended;
        campaigns.put(&campaign).unwrap();

        process(
            PlayMessage {
                campaign_id: campaign_id.clone(),
                interaction_id: "int-2".into(),
                interaction_token: None,
                options: declare_options("search the entry hall"),
            },
            &campaigns,
            &dedup,
            &sender,
        )
        .await;

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].content.contains("ended"));
    }

    #[tokio::test]
    async fn rejects_declare_on_paused_campaign() {
        let campaigns = SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let dedup = SqliteDedupStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let sender = RecordingSender::new();
        let campaign_id = active_campaign(&campaigns);
        let mut campaign = campaigns.get(&campaign_id).unwrap().unwrap();
        campaign.lifecycle.paused = true;
        campaigns.put(&campaign).unwrap();

        process(
            PlayMessage {
                campaign_id: campaign_id.clone(),
                interaction_id: "int-3".into(),
                interaction_token: None,
                options: declare_options("search the entry hall"),
            },
            &campaigns,
            &dedup,
            &sender,
        )
        .await;

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].content, narrative::play_campaign_paused());
    }

    #[tokio::test]
    async fn repeated_interaction_id_is_skipped() {
        let campaigns = SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let dedup = SqliteDedupStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let sender = RecordingSender::new();
        let campaign_id = active_campaign(&campaigns);
        dedup.record(Stage::Play, "int-1", None).unwrap();

        process(
            PlayMessage {
                campaign_id,
                interaction_id: "int-1".into(),
                interaction_token: None,
                options: declare_options("search the entry hall"),
            },
            &campaigns,
            &dedup,
            &sender,
        )
        .await;

        assert!(sender.sent.lock().unwrap().is_empty());
    }
}
