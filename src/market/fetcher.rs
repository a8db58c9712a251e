//! Cached market fetcher
//!
//! Wraps [`GammaClient`] with the TTL cache and the optional snapshot store.

use super::gamma::GammaClient;
use super::{MarketQuery, MarketRecord};
use crate::cache::TtlCache;
use crate::error::Result;
use crate::storage::SqliteStore;
use crate::telemetry::{record_cache, CacheEvent};
use std::time::Duration;

/// Cache key for a listing: `(active_only, limit, category)`
pub type MarketCacheKey = (bool, usize, Option<String>);

/// Market fetcher with listing cache and snapshot persistence
pub struct MarketFetcher {
    gamma: GammaClient,
    cache: Option<TtlCache<MarketCacheKey, Vec<MarketRecord>>>,
    storage: Option<SqliteStore>,
}

impl MarketFetcher {
    /// Fetcher without cache or storage
    pub fn new(gamma: GammaClient) -> Self {
        Self {
            gamma,
            cache: None,
            storage: None,
        }
    }

    /// Enable the listing cache with `ttl`
    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(TtlCache::new(ttl));
        self
    }

    /// Persist every fetched market to `storage`
    pub fn with_storage(mut self, storage: SqliteStore) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn gamma(&self) -> &GammaClient {
        &self.gamma
    }

    pub fn storage(&self) -> Option<&SqliteStore> {
        self.storage.as_ref()
    }

    /// Market listing, served from the cache when allowed
    ///
    /// A cache hit makes no network call.
    pub async fn get_markets(
        &mut self,
        query: &MarketQuery,
        use_cache: bool,
    ) -> Result<Vec<MarketRecord>> {
        let key: MarketCacheKey = (query.active_only, query.limit, query.category.clone());

        if use_cache {
            if let Some(cached) = self.cache.as_mut().and_then(|c| c.get(&key)) {
                record_cache(CacheEvent::Hit);
                tracing::debug!(count = cached.len(), "Market listing served from cache");
                return Ok(cached);
            }
            if self.cache.is_some() {
                record_cache(CacheEvent::Miss);
            }
        }

        let markets = self.gamma.fetch_markets(query).await?;

        if let Some(storage) = &self.storage {
            for market in &markets {
                storage.save_market(market);
            }
        }

        if use_cache {
            if let Some(cache) = self.cache.as_mut() {
                cache.set(key, markets.clone());
            }
        }

        tracing::info!(count = markets.len(), "Fetched markets");
        Ok(markets)
    }

    /// Active markets whose question or description contains `query`
    ///
    /// Scans `limit * 3` of the most traded active markets.
    pub async fn search_markets(&mut self, query: &str, limit: usize) -> Result<Vec<MarketRecord>> {
        let listing = MarketQuery::new(true, limit.saturating_mul(3));
        let mut markets = self.get_markets(&listing, true).await?;

        markets.retain(|m| m.matches(query));
        markets.truncate(limit);

        tracing::info!(query, found = markets.len(), "Market search complete");
        Ok(markets)
    }

    /// Single market lookup, `None` on any failure
    pub async fn get_market_by_id(&self, id: &str) -> Option<MarketRecord> {
        self.gamma.get_market_by_id(id).await
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
            tracing::info!("Market cache cleared");
        }
    }

    /// Entries held by the cache, expired ones included
    pub fn cache_size(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.size())
    }
}
