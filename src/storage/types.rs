//! Storage record types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

/// A stored price observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    pub id: i64,
    pub token_id: String,
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Where the observation came from, e.g. `api` or `orderbook`
    pub source: String,
}

/// Row counts and file size of the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageStats {
    pub markets: u64,
    pub prices: u64,
    pub db_path: PathBuf,
    pub db_size_mb: f64,
}
