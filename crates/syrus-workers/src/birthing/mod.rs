//! Birthing Worker (spec §4.3): draws a variance-controlled seed package
//! from the embedded corpus and hands it off to Blueprinting. The drawing
//! itself lives in `syrus-seeds`; this module is the stage plumbing around
//! it (dedup, load, narrative-on-failure, fan-out).

use tracing::warn;

use syrus_core::types::Stage;
use syrus_messaging::{ChannelSender, OutboundMessage};
use syrus_queue::{MessageGroupId, Queue};
use syrus_seeds::RngSource;
use syrus_store::{load_or_not_found, CampaignStore, DedupStore};

use crate::error::{outcome_for, WorkerError, WorkerOutcome};
use crate::messages::{BirthingMessage, BlueprintMessage};
use crate::narrative;

pub async fn process(
    msg: BirthingMessage,
    campaigns: &dyn CampaignStore,
    dedup: &dyn DedupStore,
    rng_source: &dyn RngSource,
    blueprint_queue: &dyn Queue<BlueprintMessage>,
    sender: &dyn ChannelSender,
) -> WorkerOutcome {
    match dedup.seen(Stage::Birthing, &msg.interaction_id, None) {
        Ok(true) => return WorkerOutcome::Success,
        Ok(false) => {}
        // A ledger read failure must never block the pipeline; proceed as unseen.
        Err(e) => warn!(error = %e, "dedup read failed, proceeding as unseen"),
    }

    let campaign = match load_or_not_found(campaigns, &msg.campaign_id) {
        Ok(c) => c,
        Err(e) => return outcome_for(WorkerError::from(e), false),
    };

    let seeds = match syrus_seeds::draw(campaign.campaign_type, rng_source) {
        Ok(s) => s,
        Err(_) => {
            let sent = sender
                .send(&OutboundMessage {
                    channel_id: campaign.meta.channel_id.clone(),
                    content: narrative::seed_selection_failed().to_string(),
                    ..Default::default()
                })
                .await
                .is_ok();
            if !sent {
                warn!(interaction_id = %msg.interaction_id, "failed to notify user of seed-selection failure");
            }
            if let Err(e) = dedup.record(Stage::Birthing, &msg.interaction_id, None) {
                warn!(error = %e, "dedup write failed after seed-selection failure");
            }
            // A non-deterministic re-draw under the same interactionId would
            // violate idempotence; never retry this path.
            return WorkerOutcome::Success;
        }
    };

    let blueprint_msg = BlueprintMessage {
        campaign_id: msg.campaign_id.clone(),
        interaction_id: msg.interaction_id.clone(),
        seeds,
    };
    if let Err(e) = blueprint_queue
        .send(MessageGroupId::from(msg.campaign_id.as_str()), blueprint_msg)
        .await
    {
        return outcome_for(WorkerError::from(e), false);
    }

    if let Err(e) = dedup.record(Stage::Birthing, &msg.interaction_id, None) {
        warn!(error = %e, "dedup write failed after successful birthing");
    }

    WorkerOutcome::Success
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;
    use syrus_core::types::{CampaignId, CampaignType, ChatSource, DecisionModel};
    use syrus_queue::InProcessQueue;
    use syrus_seeds::FixedRngSource;
    use syrus_store::{SqliteCampaignStore, SqliteDedupStore};

    struct RecordingSender {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self { sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait::async_trait]
    impl ChannelSender for RecordingSender {
        async fn send(&self, message: &OutboundMessage) -> syrus_messaging::Result<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn seeded_campaign(campaigns: &SqliteCampaignStore) -> CampaignId {
        let campaign = syrus_store::model::Campaign::new_configuring(
            CampaignId::from("chan-1"),
            CampaignType::Short,
            DecisionModel::Host,
            "host-1",
            ChatSource::Discord,
            "chan-1",
        );
        campaigns.put(&campaign).unwrap();
        campaign.campaign_id
    }

    #[tokio::test]
    async fn draws_seeds_and_enqueues_blueprint_message() {
        let campaigns = SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let dedup = SqliteDedupStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let blueprint_queue: InProcessQueue<BlueprintMessage> = InProcessQueue::new();
        let sender = RecordingSender::new();
        let campaign_id = seeded_campaign(&campaigns);

        let outcome = process(
            BirthingMessage { campaign_id: campaign_id.clone(), interaction_id: "int-1".into() },
            &campaigns,
            &dedup,
            &FixedRngSource(7),
            &blueprint_queue,
            &sender,
        )
        .await;

        assert!(matches!(outcome, WorkerOutcome::Success));
        assert!(sender.sent.lock().unwrap().is_empty());
        let envelope = blueprint_queue.receive().await.unwrap().unwrap();
        assert_eq!(envelope.message.campaign_id, campaign_id);
        assert!(dedup.seen(Stage::Birthing, "int-1", None).unwrap());
    }

    #[tokio::test]
    async fn repeated_interaction_id_is_skipped() {
        let campaigns = SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let dedup = SqliteDedupStore::new(Connection::open_in_memory().unwrap()).unwrap();
        let blueprint_queue: InProcessQueue<BlueprintMessage> = InProcessQueue::new();
        let sender = RecordingSender::new();
        let campaign_id = seeded_campaign(&campaigns);
        dedup.record(Stage::Birthing, "int-1", None).unwrap();

        process(
            BirthingMessage { campaign_id, interaction_id: "int-1".into() },
            &campaigns,
            &dedup,
            &FixedRngSource(7),
            &blueprint_queue,
            &sender,
        )
        .await;

        assert!(blueprint_queue.receive().await.unwrap().is_none());
    }
}
