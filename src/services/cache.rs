use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::{DateRange, PriceBar};

/// Cache key: upper-cased symbol plus the requested bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HistoryKey {
    symbol: String,
    range: DateRange,
}

struct CachedHistory {
    bars: Arc<Vec<PriceBar>>,
    expires_at: Instant,
}

/// Thread-safe TTL cache of fetched price histories.
pub struct HistoryCache {
    entries: DashMap<HistoryKey, CachedHistory>,
    ttl: Duration,
}

impl HistoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Cached bars for `symbol` over `range`, if present and fresh.
    pub fn get(&self, symbol: &str, range: DateRange) -> Option<Arc<Vec<PriceBar>>> {
        let key = HistoryKey {
            symbol: symbol.to_uppercase(),
            range,
        };
        let entry = self.entries.get(&key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.bars.clone())
        } else {
            drop(entry);
            self.entries.remove(&key);
            None
        }
    }

    pub fn insert(&self, symbol: &str, range: DateRange, bars: Arc<Vec<PriceBar>>) {
        self.entries.insert(
            HistoryKey {
                symbol: symbol.to_uppercase(),
                range,
            },
            CachedHistory {
                bars,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop every cached range for `symbol`.
    pub fn invalidate(&self, symbol: &str) {
        let symbol = symbol.to_uppercase();
        self.entries.retain(|key, _| key.symbol != symbol);
    }

    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
