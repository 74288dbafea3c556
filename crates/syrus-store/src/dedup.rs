use std::sync::Mutex;

use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use tracing::warn;

use crate::error::Result;
use syrus_core::types::Stage;

/// The idempotency ledger keyed `{stage}:{interaction_id}[:{sub_artifact}]`.
/// spec.md §9 requires the stage prefix on every write, with no exception —
/// this is enforced here rather than left to callers by taking `Stage`
/// as a typed argument instead of a bare string.
pub trait DedupStore: Send + Sync {
    /// `true` if this key has already been recorded (and has not expired).
    fn seen(&self, stage: Stage, interaction_id: &str, sub_artifact: Option<&str>) -> Result<bool>;
    /// Record the key as seen. Call only after the side effect it guards has
    /// actually succeeded — never before.
    fn record(&self, stage: Stage, interaction_id: &str, sub_artifact: Option<&str>) -> Result<()>;
}

fn dedup_key(stage: Stage, interaction_id: &str, sub_artifact: Option<&str>) -> String {
    match sub_artifact {
        Some(sub) => format!("{stage}:{interaction_id}:{sub}"),
        None => format!("{stage}:{interaction_id}"),
    }
}

const TTL_HOURS: i64 = 24;

pub struct SqliteDedupStore {
    db: Mutex<Connection>,
}

impl SqliteDedupStore {
    pub fn new(conn: Connection) -> Result<Self> {
        crate::db::init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }
}

impl DedupStore for SqliteDedupStore {
    fn seen(&self, stage: Stage, interaction_id: &str, sub_artifact: Option<&str>) -> Result<bool> {
        let key = dedup_key(stage, interaction_id, sub_artifact);
        let db = self.db.lock().unwrap();
        let result = db.query_row(
            "SELECT expires_at FROM dedup_ledger WHERE dedup_key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(expires_at) => match expires_at.parse::<chrono::DateTime<Utc>>() {
                Ok(expiry) => Ok(expiry > Utc::now()),
                Err(_) => Ok(false),
            },
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            // A read failure against the dedup ledger must never block the
            // pipeline; treat it as "not seen" and let the caller proceed.
            Err(err) => {
                warn!(error = %err, "dedup ledger read failed, treating as unseen");
                Ok(false)
            }
        }
    }

    fn record(&self, stage: Stage, interaction_id: &str, sub_artifact: Option<&str>) -> Result<()> {
        let key = dedup_key(stage, interaction_id, sub_artifact);
        let expires_at = (Utc::now() + Duration::hours(TTL_HOURS)).to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO dedup_ledger (dedup_key, expires_at) VALUES (?1, ?2)
             ON CONFLICT(dedup_key) DO UPDATE SET expires_at = excluded.expires_at",
            params![key, expires_at],
        )?;
        Ok(())
    }
}
