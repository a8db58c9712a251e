//! SQLite-backed snapshot store
//!
//! Every operation opens and closes its own connection.

use super::schema::create_tables;
use super::types::{PriceRecord, StorageStats};
use crate::codec::{decimal_to_f64, f64_to_decimal};
use crate::error::{PolymarketError, Result};
use crate::market::MarketRecord;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

/// Fixed-width RFC 3339 UTC timestamp, so string order is time order
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Snapshot store backed by a single SQLite file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open the store, creating the parent directory and schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PolymarketError::Config(format!(
                    "Failed to create data directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let store = Self { path };
        store
            .connect()
            .and_then(|conn| create_tables(&conn))
            .map_err(|e| {
                PolymarketError::Config(format!(
                    "Failed to initialize database {}: {}",
                    store.path.display(),
                    e
                ))
            })?;

        tracing::info!(path = %store.path.display(), "Storage initialized");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }

    /// Upsert a market snapshot by id
    pub fn save_market(&self, market: &MarketRecord) {
        let result = serde_json::to_string(market)
            .map_err(|e| e.to_string())
            .and_then(|data| {
                let now = format_timestamp(Utc::now());
                self.connect()
                    .and_then(|conn| {
                        conn.execute(
                            "INSERT OR REPLACE INTO markets (id, data, created_at, updated_at)
                             VALUES (?1, ?2, ?3, ?4)",
                            params![market.id, data, now, now],
                        )
                    })
                    .map_err(|e| e.to_string())
            });

        if let Err(e) = result {
            tracing::error!(market_id = %market.id, error = %e, "Failed to save market");
        }
    }

    /// Stored snapshot of a market
    pub fn get_market(&self, id: &str) -> Option<MarketRecord> {
        let data = self.connect().and_then(|conn| {
            conn.query_row("SELECT data FROM markets WHERE id = ?1", [id], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        });

        match data {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(market) => Some(market),
                Err(e) => {
                    tracing::error!(market_id = id, error = %e, "Stored market does not decode");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::error!(market_id = id, error = %e, "Failed to get market");
                None
            }
        }
    }

    /// Record a price observed now
    pub fn save_price(&self, token_id: &str, price: Decimal, volume: Decimal, source: &str) {
        self.save_price_at(token_id, price, volume, source, Utc::now());
    }

    /// Record a price observed at `timestamp`
    pub fn save_price_at(
        &self,
        token_id: &str,
        price: Decimal,
        volume: Decimal,
        source: &str,
        timestamp: DateTime<Utc>,
    ) {
        let result = self.connect().and_then(|conn| {
            conn.execute(
                "INSERT INTO prices (token_id, price, volume, timestamp, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    token_id,
                    decimal_to_f64(price),
                    decimal_to_f64(volume),
                    format_timestamp(timestamp),
                    source
                ],
            )
        });

        if let Err(e) = result {
            tracing::error!(token_id, error = %e, "Failed to save price");
        }
    }

    /// Most recent observations for a token, newest first
    pub fn get_recent_prices(&self, token_id: &str, limit: usize) -> Vec<PriceRecord> {
        let result = self.connect().and_then(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, token_id, price, volume, timestamp, source FROM prices
                 WHERE token_id = ?1
                 ORDER BY timestamp DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![token_id, limit as i64], |row| {
                let timestamp: String = row.get(4)?;
                Ok(PriceRecord {
                    id: row.get(0)?,
                    token_id: row.get(1)?,
                    price: f64_to_decimal(row.get(2)?),
                    volume: f64_to_decimal(row.get::<_, Option<f64>>(3)?.unwrap_or_default()),
                    timestamp: parse_timestamp(&timestamp).unwrap_or_default(),
                    source: row
                        .get::<_, Option<String>>(5)?
                        .unwrap_or_else(|| "api".to_string()),
                })
            })?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
        });

        result.unwrap_or_else(|e| {
            tracing::error!(token_id, error = %e, "Failed to get prices");
            Vec::new()
        })
    }

    /// Delete price rows older than `days`, returning how many went
    pub fn cleanup_old_prices(&self, days: u32) -> usize {
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let cutoff = format_timestamp(cutoff);
        let result = self.connect().and_then(|conn| {
            conn.execute("DELETE FROM prices WHERE timestamp < ?1", [cutoff])
        });

        match result {
            Ok(deleted) => {
                tracing::info!(deleted, days, "Cleaned up old price records");
                deleted
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to cleanup old prices");
                0
            }
        }
    }

    pub fn stats(&self) -> Option<StorageStats> {
        let counts = self.connect().and_then(|conn| {
            let markets: i64 = conn.query_row("SELECT COUNT(*) FROM markets", [], |r| r.get(0))?;
            let prices: i64 = conn.query_row("SELECT COUNT(*) FROM prices", [], |r| r.get(0))?;
            Ok((markets, prices))
        });

        match counts {
            Ok((markets, prices)) => {
                let bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
                Some(StorageStats {
                    markets: markets.max(0) as u64,
                    prices: prices.max(0) as u64,
                    db_path: self.path.clone(),
                    db_size_mb: bytes as f64 / 1024.0 / 1024.0,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to get storage stats");
                None
            }
        }
    }
}
