use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::model::Host;
use syrus_core::types::ChatSource;

/// The host whitelist (spec §3 "Host"), composite-keyed by `(id, source)`.
pub trait HostStore: Send + Sync {
    fn lookup(&self, id: &str, source: ChatSource) -> Result<Option<Host>>;
    fn put(&self, host: &Host) -> Result<()>;
}

pub struct SqliteHostStore {
    db: Mutex<Connection>,
}

impl SqliteHostStore {
    pub fn new(conn: Connection) -> Result<Self> {
        crate::db::init_db(&conn)?;
        Ok(Self { db: Mutex::new(conn) })
    }
}

impl HostStore for SqliteHostStore {
    fn lookup(&self, id: &str, source: ChatSource) -> Result<Option<Host>> {
        let db = self.db.lock().unwrap();
        let row: Option<(String, String)> = db
            .query_row(
                "SELECT id, display_name FROM hosts WHERE id = ?1 AND source = ?2",
                params![id, source.to_string()],
                |row| Ok((row.get(0)?, row.get::<_, Option<String>>(1)?.unwrap_or_default())),
            )
            .optional()?;
        Ok(row.map(|(id, display_name)| Host {
            id,
            source,
            display_name: if display_name.is_empty() {
                None
            } else {
                Some(display_name)
            },
        }))
    }

    fn put(&self, host: &Host) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO hosts (id, source, display_name) VALUES (?1, ?2, ?3)
             ON CONFLICT(id, source) DO UPDATE SET display_name = excluded.display_name",
            params![host.id, host.source.to_string(), host.display_name],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_host_lookup_returns_none() {
        let store = SqliteHostStore::new(Connection::open_in_memory().unwrap()).unwrap();
        assert!(store.lookup("u-1", ChatSource::Discord).unwrap().is_none());
    }

    #[test]
    fn composite_key_distinguishes_by_source() {
        let store = SqliteHostStore::new(Connection::open_in_memory().unwrap()).unwrap();
        store
            .put(&Host {
                id: "u-1".into(),
                source: ChatSource::Discord,
                display_name: Some("Alice".into()),
            })
            .unwrap();
        assert!(store.lookup("u-1", ChatSource::Discord).unwrap().is_some());
        assert!(store.lookup("u-1", ChatSource::Whatsapp).unwrap().is_none());
    }
}
