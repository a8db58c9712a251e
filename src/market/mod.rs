//! Market discovery module
//!
//! Fetches prediction markets from Polymarket's Gamma API, normalizes the
//! loosely typed listing into [`MarketRecord`]s and caches the results.

mod category;
mod fetcher;
mod gamma;

pub use category::{detect_category, CATEGORY_KEYWORDS, OTHER_CATEGORY};
pub use fetcher::{MarketCacheKey, MarketFetcher};
pub use gamma::{GammaClient, GammaConfig, GammaMarket};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Active,
    Closed,
    /// Representable, but never reported by the listing
    Resolved,
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarketStatus::Active => "active",
            MarketStatus::Closed => "closed",
            MarketStatus::Resolved => "resolved",
        })
    }
}

/// One tradeable outcome of a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeToken {
    pub token_id: String,
    /// Outcome label, e.g. "Yes"
    pub outcome: String,
    pub price: Decimal,
    pub volume: Decimal,
}

/// A normalized prediction market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub id: String,
    pub question: String,
    pub description: String,
    pub end_date: DateTime<Utc>,
    pub status: MarketStatus,
    pub volume: Decimal,
    pub liquidity: Decimal,
    /// Outcome tokens, in listing order
    pub outcomes: Vec<OutcomeToken>,
    pub condition_id: Option<String>,
    pub neg_risk: bool,
    /// Inferred from the question text
    pub category: String,
}

impl MarketRecord {
    pub fn is_active(&self) -> bool {
        self.status == MarketStatus::Active
    }

    /// Outcome by label, case-insensitive
    pub fn outcome(&self, label: &str) -> Option<&OutcomeToken> {
        self.outcomes
            .iter()
            .find(|o| o.outcome.eq_ignore_ascii_case(label))
    }

    pub fn token_ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(|o| o.token_id.as_str())
    }

    /// Case-insensitive match on question or description
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.question.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Parameters for a market listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarketQuery {
    pub active_only: bool,
    pub limit: usize,
    pub category: Option<String>,
}

impl MarketQuery {
    pub fn new(active_only: bool, limit: usize) -> Self {
        Self {
            active_only,
            limit,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self::new(true, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> MarketRecord {
        MarketRecord {
            id: "1".to_string(),
            question: "Will Bitcoin close above $100k?".to_string(),
            description: "Resolves YES if BTC/USD closes above 100,000.".to_string(),
            end_date: Utc::now(),
            status: MarketStatus::Active,
            volume: dec!(1200),
            liquidity: dec!(300),
            outcomes: vec![
                OutcomeToken {
                    token_id: "111".to_string(),
                    outcome: "Yes".to_string(),
                    price: dec!(0.6),
                    volume: Decimal::ZERO,
                },
                OutcomeToken {
                    token_id: "222".to_string(),
                    outcome: "No".to_string(),
                    price: dec!(0.4),
                    volume: Decimal::ZERO,
                },
            ],
            condition_id: Some("0xcond".to_string()),
            neg_risk: false,
            category: "crypto".to_string(),
        }
    }

    #[test]
    fn test_outcome_lookup() {
        let market = sample();
        assert_eq!(market.outcome("yes").unwrap().token_id, "111");
        assert!(market.outcome("maybe").is_none());
        assert_eq!(market.token_ids().collect::<Vec<_>>(), vec!["111", "222"]);
    }

    #[test]
    fn test_matches_question_and_description() {
        let market = sample();
        assert!(market.matches("bitcoin"));
        assert!(market.matches("BTC/USD"));
        assert!(!market.matches("election"));
    }

    #[test]
    fn test_record_json_roundtrip_keeps_status() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["status"], "active");
        let back: MarketRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_with_end(back.end_date));
    }

    fn sample_with_end(end_date: DateTime<Utc>) -> MarketRecord {
        MarketRecord {
            end_date,
            ..sample()
        }
    }

    #[test]
    fn test_query_defaults() {
        let query = MarketQuery::default();
        assert!(query.active_only);
        assert_eq!(query.limit, 100);
        assert_eq!(query.with_category("sports").category.as_deref(), Some("sports"));
    }
}
