use rusqlite::{Connection, Result};

/// Initialise all Syrus tables. Safe to call on every startup (idempotent),
/// matching the shape of `skynet-memory::db::init_db`.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_campaigns_table(conn)?;
    create_hosts_table(conn)?;
    create_dedup_table(conn)?;
    create_confirmations_table(conn)?;
    Ok(())
}

fn create_campaigns_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS campaigns (
            campaign_id  TEXT PRIMARY KEY,
            channel_id   TEXT NOT NULL,
            status       TEXT NOT NULL,
            data         TEXT NOT NULL,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_campaigns_channel
            ON campaigns(channel_id);",
    )
}

fn create_hosts_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS hosts (
            id            TEXT NOT NULL,
            source        TEXT NOT NULL,
            display_name  TEXT,
            PRIMARY KEY (id, source)
        );",
    )
}

fn create_dedup_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS dedup_ledger (
            dedup_key   TEXT PRIMARY KEY,
            expires_at  TEXT NOT NULL
        );",
    )
}

fn create_confirmations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS pending_confirmations (
            campaign_id  TEXT PRIMARY KEY,
            intent       TEXT NOT NULL,
            token        TEXT NOT NULL,
            expires_at   TEXT NOT NULL
        );",
    )
}
