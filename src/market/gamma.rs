//! Gamma API client for market discovery
//!
//! The listing endpoint returns loosely typed JSON. Each item is decoded on
//! its own into a [`GammaMarket`] and normalized into a [`MarketRecord`]; an
//! item that does not decode is logged and skipped without failing the
//! listing.

use super::category::detect_category;
use super::{MarketQuery, MarketRecord, MarketStatus, OutcomeToken};
use crate::codec::{
    de_lenient_bool, de_lenient_decimal, de_string_or_number, decimal_or_zero, scalar_string,
    string_list, value_list,
};
use crate::config::DEFAULT_GAMMA_URL;
use crate::error::{PolymarketError, Result};
use crate::telemetry::{record_markets_dropped, record_markets_fetched};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for the Gamma client
#[derive(Debug, Clone)]
pub struct GammaConfig {
    /// Base URL for the Gamma API, without trailing slash
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GAMMA_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for Polymarket's Gamma API
pub struct GammaClient {
    config: GammaConfig,
    client: Client,
}

impl GammaClient {
    /// Create a new Gamma API client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(GammaConfig::default())
    }

    /// Create a new client against `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(GammaConfig {
            base_url: base_url.into(),
            ..GammaConfig::default()
        })
    }

    /// Create a new client with custom configuration
    pub fn with_config(mut config: GammaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PolymarketError::Config(format!("Failed to create HTTP client: {}", e)))?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self { config, client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Fetch one page of the market listing, ordered by volume descending
    pub async fn fetch_markets(&self, query: &MarketQuery) -> Result<Vec<MarketRecord>> {
        let url = format!("{}/markets", self.config.base_url);

        let mut params = vec![
            ("active", query.active_only.to_string()),
            ("limit", query.limit.to_string()),
            ("order", "volume".to_string()),
            ("ascending", "false".to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }

        tracing::debug!(
            url = %url,
            active = query.active_only,
            limit = query.limit,
            "Fetching markets from Gamma API"
        );

        let items: Vec<Value> = self.get_json(&url, &params).await?;
        let total = items.len();
        let markets: Vec<MarketRecord> = items.into_iter().filter_map(decode_market).collect();

        record_markets_fetched(markets.len());
        record_markets_dropped(total - markets.len());
        tracing::debug!(
            fetched = markets.len(),
            dropped = total - markets.len(),
            "Decoded market listing"
        );

        Ok(markets)
    }

    /// Fetch a single market; any failure is logged and yields `None`
    pub async fn get_market_by_id(&self, id: &str) -> Option<MarketRecord> {
        let url = format!("{}/markets/{}", self.config.base_url, id);

        match self.get_json::<Value>(&url, &[]).await {
            Ok(item) => decode_market(item),
            Err(e) => {
                tracing::error!(market_id = id, error = %e, "Failed to get market");
                None
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| PolymarketError::api(format!("Gamma request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PolymarketError::api_status(
                status.as_u16(),
                format!("Gamma API error: {} - {}", status, body),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PolymarketError::api(format!("Invalid Gamma response: {}", e)))
    }
}

/// Raw market item from the Gamma listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(deserialize_with = "de_string_or_number")]
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_bool")]
    pub active: bool,
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub volume: Decimal,
    #[serde(default, deserialize_with = "de_lenient_decimal")]
    pub liquidity: Decimal,
    /// Array or JSON-encoded array of labels
    #[serde(default)]
    pub outcomes: Value,
    /// Array or JSON-encoded array of prices
    #[serde(default)]
    pub outcome_prices: Value,
    /// Array or JSON-encoded array of token ids
    #[serde(default)]
    pub clob_token_ids: Value,
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_bool")]
    pub neg_risk: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl GammaMarket {
    /// Normalize into a [`MarketRecord`]
    pub fn into_record(self) -> MarketRecord {
        let labels = string_list(&self.outcomes);
        let prices = value_list(&self.outcome_prices);

        let outcomes = string_list(&self.clob_token_ids)
            .into_iter()
            .enumerate()
            .map(|(i, token_id)| OutcomeToken {
                token_id,
                outcome: labels
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("Outcome {}", i + 1)),
                price: prices.get(i).map(decimal_or_zero).unwrap_or(Decimal::ZERO),
                volume: Decimal::ZERO,
            })
            .collect();

        let status = if self.active {
            MarketStatus::Active
        } else {
            MarketStatus::Closed
        };

        MarketRecord {
            category: detect_category(&self.question).to_string(),
            end_date: parse_end_date(self.end_date.as_deref()),
            id: self.id,
            question: self.question,
            description: self.description.unwrap_or_default(),
            status,
            volume: self.volume,
            liquidity: self.liquidity,
            outcomes,
            condition_id: self.condition_id.filter(|c| !c.is_empty()),
            neg_risk: self.neg_risk,
        }
    }
}

/// Decode one listing item, logging and dropping it on failure
fn decode_market(item: Value) -> Option<MarketRecord> {
    let id = item.get("id").and_then(scalar_string);
    match serde_json::from_value::<GammaMarket>(item) {
        Ok(raw) => Some(raw.into_record()),
        Err(e) => {
            tracing::warn!(
                market_id = id.as_deref().unwrap_or("unknown"),
                error = %e,
                "Skipping malformed market"
            );
            None
        }
    }
}

/// RFC 3339 (or bare date); anything else is "now"
fn parse_end_date(value: Option<&str>) -> DateTime<Utc> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Utc::now();
    };

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
        .unwrap_or_else(Utc::now)
}
