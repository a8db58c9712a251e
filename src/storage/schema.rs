//! Database schema creation

use rusqlite::{Connection, Result};

/// Create all tables and indexes if missing
pub fn create_tables(conn: &Connection) -> Result<()> {
    // Markets: latest JSON snapshot per market id
    conn.execute(
        "CREATE TABLE IF NOT EXISTS markets (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    // Prices: append-only observations
    conn.execute(
        "CREATE TABLE IF NOT EXISTS prices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            token_id TEXT NOT NULL,
            price REAL NOT NULL,
            volume REAL DEFAULT 0,
            timestamp TEXT NOT NULL,
            source TEXT DEFAULT 'api'
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_prices_token_id ON prices(token_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_prices_timestamp ON prices(timestamp)",
        [],
    )?;

    Ok(())
}
