// Price Feed Integration
//
// The keeper only ever asks one question: what is the current spot price for a market id,
// and is that price live. Oracles post updates per source; the feed takes the median of the
// fresh ones. A market with no fresh price is "down" and collateral priced off it is rejected.

use crate::types::{Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a price source
pub type PriceSourceId = u32;

/// A single price update from an oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub price: Decimal,
    pub timestamp: Timestamp,
    pub source_id: PriceSourceId,
    /// Time to live in seconds before this price is considered stale
    pub ttl_seconds: u64,
}

impl PriceUpdate {
    pub fn new(price: Decimal, timestamp: Timestamp, source_id: PriceSourceId) -> Self {
        Self {
            price,
            timestamp,
            source_id,
            ttl_seconds: 3600, // default 1 hour TTL
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl_seconds = ttl;
        self
    }

    pub fn is_stale(&self, now: Timestamp) -> bool {
        now.as_millis() > self.timestamp.as_millis() + (self.ttl_seconds as i64) * 1000
    }
}

/// Configuration for price feed aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    /// Minimum number of fresh sources required for a valid price
    pub min_sources: usize,
    /// Maximum deviation between sources before rejecting (as ratio, e.g. 0.02 = 2%)
    pub max_source_deviation: Decimal,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            min_sources: 1,
            max_source_deviation: Decimal::new(2, 2), // 2%
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceFeedError {
    #[error("No prices posted for market {0}")]
    UnknownMarket(String),

    #[error("All prices for market {0} are stale")]
    AllSourcesStale(String),

    #[error("Market {market_id} has {available} fresh sources, {required} required")]
    InsufficientSources {
        market_id: String,
        required: usize,
        available: usize,
    },

    #[error("Sources for market {market_id} deviate by {deviation}")]
    ExcessiveDeviation { market_id: String, deviation: Decimal },

    #[error("Market {0} aggregated to a non-positive price")]
    NonPositivePrice(String),
}

/// Anything that can quote a live spot price. The keeper consumes this, never a concrete feed.
pub trait PriceOracle {
    fn current_price(&self, market_id: &str, now: Timestamp) -> Result<Price, PriceFeedError>;
}

/// Median price feed. Keeps the latest update per (market, source).
#[derive(Debug, Clone, Default)]
pub struct PriceFeed {
    config: PriceFeedConfig,
    markets: HashMap<String, Vec<PriceUpdate>>,
}

impl PriceFeed {
    pub fn new(config: PriceFeedConfig) -> Self {
        Self {
            config,
            markets: HashMap::new(),
        }
    }

    /// Submit a price update from a source. Replaces that source's previous update.
    pub fn post_price(&mut self, market_id: &str, update: PriceUpdate) {
        let updates = self.markets.entry(market_id.to_string()).or_default();
        match updates.iter_mut().find(|u| u.source_id == update.source_id) {
            Some(existing) => *existing = update,
            None => updates.push(update),
        }
    }

    /// Drop every posted price for a market, taking it offline.
    pub fn clear_market(&mut self, market_id: &str) {
        self.markets.remove(market_id);
    }

    pub fn source_count(&self, market_id: &str) -> usize {
        self.markets.get(market_id).map_or(0, Vec::len)
    }

    fn median(prices: &mut [Decimal]) -> Decimal {
        prices.sort();
        let len = prices.len();
        if len % 2 == 0 {
            (prices[len / 2 - 1] + prices[len / 2]) / Decimal::new(2, 0)
        } else {
            prices[len / 2]
        }
    }
}

impl PriceOracle for PriceFeed {
    fn current_price(&self, market_id: &str, now: Timestamp) -> Result<Price, PriceFeedError> {
        let updates = self
            .markets
            .get(market_id)
            .ok_or_else(|| PriceFeedError::UnknownMarket(market_id.to_string()))?;

        let mut fresh: Vec<Decimal> = updates
            .iter()
            .filter(|u| !u.is_stale(now))
            .map(|u| u.price)
            .collect();

        if fresh.is_empty() {
            return Err(PriceFeedError::AllSourcesStale(market_id.to_string()));
        }

        if fresh.len() < self.config.min_sources {
            return Err(PriceFeedError::InsufficientSources {
                market_id: market_id.to_string(),
                required: self.config.min_sources,
                available: fresh.len(),
            });
        }

        // check deviation between sources
        if let (Some(min), Some(max)) = (fresh.iter().min(), fresh.iter().max()) {
            if *min > Decimal::ZERO {
                let deviation = (*max - *min) / *min;
                if deviation > self.config.max_source_deviation {
                    return Err(PriceFeedError::ExcessiveDeviation {
                        market_id: market_id.to_string(),
                        deviation,
                    });
                }
            }
        }

        let median = Self::median(&mut fresh);
        Price::new(median).ok_or_else(|| PriceFeedError::NonPositivePrice(market_id.to_string()))
    }
}
