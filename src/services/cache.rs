//! TTL cache for fetched price series.

use crate::types::PriceSeries;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Thread-safe cache keyed by ticker symbol and bar interval.
///
/// A scheduler pass and an interactive pass inside the TTL window share
/// fetched history instead of hitting the rate-limited provider twice; the
/// weekly series in particular is otherwise fetched once per ticker per pass.
pub struct SeriesCache {
    data: DashMap<String, CacheEntry>,
    ttl: Duration,
}

struct CacheEntry {
    series: PriceSeries,
    expires_at: Instant,
}

impl SeriesCache {
    /// Create a cache with the given entry TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: DashMap::new(),
            ttl,
        }
    }

    fn key(symbol: &str, interval: &str) -> String {
        format!("{}:{}", symbol.to_uppercase(), interval)
    }

    /// Get a cached series if present and not expired.
    pub fn get(&self, symbol: &str, interval: &str) -> Option<PriceSeries> {
        let key = Self::key(symbol, interval);
        let entry = self.data.get(&key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.series.clone())
        } else {
            drop(entry);
            self.data.remove(&key);
            None
        }
    }

    /// Store a series under the default TTL.
    pub fn insert(&self, symbol: &str, interval: &str, series: PriceSeries) {
        self.data.insert(
            Self::key(symbol, interval),
            CacheEntry {
                series,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop all expired entries.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.data.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
