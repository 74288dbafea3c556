use std::sync::Mutex;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use syrus_core::types::CampaignId;

/// A pending host-confirmation token (spec §4.2 "destructive confirm" flow:
/// end/restart/etc. require a second host interaction within the TTL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub intent: String,
    pub token: String,
}

const TTL_SECONDS: i64 = 60;

pub trait ConfirmationStore: Send + Sync {
    fn put(&self, campaign_id: &CampaignId, intent: &str, token: &str) -> Result<()>;
    /// Single-use: a matching, unexpired confirmation is consumed (deleted)
    /// on read, regardless of whether the caller ultimately honours it.
    fn take(&self, campaign_id: &CampaignId) -> Result<Option<PendingConfirmation>>;
}

pub struct SqliteConfirmationStore {
    db: Mutex<Connection>,
}

impl SqliteConfirmationStore {
    pub fn new(conn: Connection) -> Result<Self> {
        crate::db::init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }
}

impl ConfirmationStore for SqliteConfirmationStore {
    fn put(&self, campaign_id: &CampaignId, intent: &str, token: &str) -> Result<()> {
        let expires_at = (Utc::now() + Duration::seconds(TTL_SECONDS)).to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO pending_confirmations (campaign_id, intent, token, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(campaign_id) DO UPDATE SET
                intent = excluded.intent,
                token = excluded.token,
                expires_at = excluded.expires_at",
            params![campaign_id.as_str(), intent, token, expires_at],
        )?;
        Ok(())
    }

    fn take(&self, campaign_id: &CampaignId) -> Result<Option<PendingConfirmation>> {
        let db = self.db.lock().unwrap();
        let row: Option<(String, String, String)> = db
            .query_row(
                "SELECT intent, token, expires_at FROM pending_confirmations WHERE campaign_id = ?1",
                params![campaign_id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let Some((intent, token, expires_at)) = row else {
            return Ok(None);
        };
        db.execute(
            "DELETE FROM pending_confirmations WHERE campaign_id = ?1",
            params![campaign_id.as_str()],
        )?;
        let still_valid = expires_at
            .parse::<chrono::DateTime<Utc>>()
            .map(|expiry| expiry > Utc::now())
            .unwrap_or(false);
        if still_valid {
            Ok(Some(PendingConfirmation { intent, token }))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteConfirmationStore {
        SqliteConfirmationStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn put_then_take_returns_confirmation_once() {
        let store = store();
        let id = CampaignId::from("chan-1");
        store.put(&id, "end_campaign", "tok-abc").unwrap();
        let first = store.take(&id).unwrap();
        assert_eq!(
            first,
            Some(PendingConfirmation {
                intent: "end_campaign".into(),
                token: "tok-abc".into(),
            })
        );
        assert!(store.take(&id).unwrap().is_none());
    }

    #[test]
    fn expired_confirmation_is_consumed_but_not_returned() {
        let store = store();
        let id = CampaignId::from("chan-2");
        let expired = (Utc::now() - Duration::seconds(1)).to_rfc3339();
        store
            .db
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO pending_confirmations (campaign_id, intent, token, expires_at)
                 VALUES (?1, 'end_campaign', 'tok', ?2)",
                params![id.as_str(), expired],
            )
            .unwrap();
        assert!(store.take(&id).unwrap().is_none());
        assert!(store.take(&id).unwrap().is_none());
    }
}
