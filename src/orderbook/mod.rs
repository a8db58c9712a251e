//! Order book module
//!
//! Point-in-time order book summaries built from the CLOB's `GET /book`

mod book;

pub use book::OrderBookSummary;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price level in the order book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Price at this level
    pub price: Decimal,
    /// Total size available
    pub size: Decimal,
}
