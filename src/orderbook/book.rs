//! Order book snapshot

use super::PriceLevel;
use crate::clob::{BookResponse, RawLevel};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// L2 aggregated order book for a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSummary {
    /// Token identifier
    pub token_id: String,
    /// Bid levels, sorted best (highest) to worst
    pub bids: Vec<PriceLevel>,
    /// Ask levels, sorted best (lowest) to worst
    pub asks: Vec<PriceLevel>,
    /// Snapshot time reported by the CLOB, or fetch time
    pub timestamp: DateTime<Utc>,
}

impl OrderBookSummary {
    /// Create a new empty order book
    pub fn new(token_id: impl Into<String>) -> Self {
        Self {
            token_id: token_id.into(),
            bids: vec![],
            asks: vec![],
            timestamp: Utc::now(),
        }
    }

    /// Build from a CLOB book, re-sorting both sides best first
    ///
    /// The CLOB lists bids ascending; the order of the response is not
    /// relied upon.
    pub fn from_response(token_id: impl Into<String>, book: BookResponse) -> Self {
        let mut bids = levels(book.bids);
        let mut asks = levels(book.asks);
        bids.sort_by(|a, b| b.price.cmp(&a.price));
        asks.sort_by(|a, b| a.price.cmp(&b.price));

        let timestamp = book
            .timestamp
            .as_deref()
            .and_then(|ts| ts.trim().parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        Self {
            token_id: token_id.into(),
            bids,
            asks,
            timestamp,
        }
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Get spread
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Total size across the first `depth` levels of each side
    pub fn depth(&self, depth: usize) -> (Decimal, Decimal) {
        let sum = |levels: &[PriceLevel]| -> Decimal {
            levels.iter().take(depth).map(|l| l.size).sum()
        };
        (sum(&self.bids), sum(&self.asks))
    }
}

fn levels(raw: Vec<RawLevel>) -> Vec<PriceLevel> {
    raw.into_iter()
        .filter(|l| l.size > Decimal::ZERO)
        .map(|l| PriceLevel {
            price: l.price,
            size: l.size,
        })
        .collect()
}
