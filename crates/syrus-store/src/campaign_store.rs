use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::model::{Campaign, CampaignStatus};
use syrus_core::types::CampaignId;

/// The out-of-scope "key-value / document store" collaborator, as seen by
/// the Campaign aggregate. A real deployment swaps this for a DynamoDB-shaped
/// client; `SqliteCampaignStore` is a faithful, testable stand-in built the
/// way `skynet-memory::manager::MemoryManager` wraps its SQLite connection.
pub trait CampaignStore: Send + Sync {
    fn get(&self, campaign_id: &CampaignId) -> Result<Option<Campaign>>;
    fn get_active_on_channel(&self, channel_id: &str) -> Result<Option<Campaign>>;
    fn put(&self, campaign: &Campaign) -> Result<()>;
}

pub struct SqliteCampaignStore {
    db: Mutex<Connection>,
}

impl SqliteCampaignStore {
    pub fn new(conn: Connection) -> Result<Self> {
        crate::db::init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }
}

impl CampaignStore for SqliteCampaignStore {
    fn get(&self, campaign_id: &CampaignId) -> Result<Option<Campaign>> {
        let db = self.db.lock().unwrap();
        let row: Option<String> = db
            .query_row(
                "SELECT data FROM campaigns WHERE campaign_id = ?1",
                params![campaign_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn get_active_on_channel(&self, channel_id: &str) -> Result<Option<Campaign>> {
        let db = self.db.lock().unwrap();
        let row: Option<String> = db
            .query_row(
                "SELECT data FROM campaigns
                 WHERE channel_id = ?1 AND status != 'ended'
                 ORDER BY created_at DESC LIMIT 1",
                params![channel_id],
                |row| row.get(0),
            )
            .optional()?;
        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put(&self, campaign: &Campaign) -> Result<()> {
        let db = self.db.lock().unwrap();
        let status_str = status_str(campaign.status);
        let data = serde_json::to_string(campaign)?;
        let now = Utc::now().to_rfc3339();
        db.execute(
            "INSERT INTO campaigns (campaign_id, channel_id, status, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(campaign_id) DO UPDATE SET
                channel_id = excluded.channel_id,
                status = excluded.status,
                data = excluded.data,
                updated_at = excluded.updated_at",
            params![
                campaign.campaign_id.as_str(),
                campaign.meta.channel_id,
                status_str,
                data,
                now
            ],
        )?;
        debug!(campaign_id = %campaign.campaign_id, status = status_str, "campaign persisted");
        Ok(())
    }
}

fn status_str(status: CampaignStatus) -> &'static str {
    match status {
        CampaignStatus::Configuring => "configuring",
        CampaignStatus::Active => "active",
        CampaignStatus::Playing => "playing",
        CampaignStatus::Paused => "paused",
        CampaignStatus::Ended => "ended",
    }
}

/// Helper used by every stage worker to fetch-or-fail with the standard
/// `StoreError::CampaignNotFound`.
pub fn load_or_not_found(
    store: &dyn CampaignStore,
    campaign_id: &CampaignId,
) -> Result<Campaign> {
    store
        .get(campaign_id)
        .and_then(|c| c.ok_or_else(|| StoreError::CampaignNotFound(campaign_id.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syrus_core::types::{ChatSource, CampaignType, DecisionModel};

    fn store() -> SqliteCampaignStore {
        SqliteCampaignStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn put_then_get_roundtrips() {
        let store = store();
        let campaign = Campaign::new_configuring(
            CampaignId::from("chan-1"),
            CampaignType::Short,
            DecisionModel::Host,
            "host-1",
            ChatSource::Discord,
            "chan-1",
        );
        store.put(&campaign).unwrap();
        let loaded = store.get(&CampaignId::from("chan-1")).unwrap().unwrap();
        assert_eq!(loaded.host_id, "host-1");
        assert_eq!(loaded.status, CampaignStatus::Configuring);
    }

    #[test]
    fn get_active_on_channel_excludes_ended() {
        let store = store();
        let mut campaign = Campaign::new_configuring(
            CampaignId::from("chan-2"),
            CampaignType::Short,
            DecisionModel::Host,
            "host-1",
            ChatSource::Discord,
            "chan-2",
        );
        campaign.status = CampaignStatus::Ended;
        campaign.lifecycle.ended_at = Some(Utc::now());
        store.put(&campaign).unwrap();
        assert!(store.get_active_on_channel("chan-2").unwrap().is_none());
    }

    #[test]
    fn one_active_campaign_per_channel_invariant_is_queryable() {
        let store = store();
        let campaign = Campaign::new_configuring(
            CampaignId::from("chan-3"),
            CampaignType::Long,
            DecisionModel::Flexible,
            "host-2",
            ChatSource::Whatsapp,
            "chan-3",
        );
        store.put(&campaign).unwrap();
        let active = store.get_active_on_channel("chan-3").unwrap();
        assert!(active.is_some());
    }
}
