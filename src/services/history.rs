//! Price history lookups with an in-memory cache in front of the provider.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::services::cache::HistoryCache;
use crate::sources::PriceHistoryProvider;
use crate::types::{DateRange, PriceBar};

/// Normalize a user-supplied ticker: trimmed and upper-cased.
pub fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::BadRequest("Symbol is required".to_string()));
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
    {
        return Err(AppError::BadRequest(format!("Invalid symbol '{}'", symbol)));
    }
    Ok(symbol)
}

/// Fetches price histories and caches them per symbol and range.
pub struct HistoryService {
    provider: Arc<dyn PriceHistoryProvider>,
    cache: HistoryCache,
}

impl HistoryService {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, ttl: Duration) -> Arc<Self> {
        info!("History service using {} provider", provider.name());
        Arc::new(Self {
            provider,
            cache: HistoryCache::new(ttl),
        })
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Bars for `symbol` in ascending date order.
    ///
    /// An empty history is reported as `NoData` rather than returned, so
    /// callers never hand an empty series to the engines.
    pub async fn history(&self, symbol: &str, range: DateRange) -> Result<Arc<Vec<PriceBar>>> {
        if let Some(bars) = self.cache.get(symbol, range) {
            debug!("History cache hit for {} {}", symbol, range.cache_key());
            return Ok(bars);
        }

        let bars = self.provider.fetch(symbol, range).await?;
        if bars.is_empty() {
            return Err(AppError::NoData(format!("No data found for {}", symbol)));
        }

        debug!(
            "Fetched {} bars for {} {} from {}",
            bars.len(),
            symbol,
            range.cache_key(),
            self.provider.name()
        );

        let bars = Arc::new(bars);
        self.cache.insert(symbol, range, bars.clone());
        Ok(bars)
    }

    pub fn invalidate(&self, symbol: &str) {
        self.cache.invalidate(symbol);
    }

    pub fn purge_expired(&self) {
        self.cache.purge_expired();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        bars: Vec<PriceBar>,
    }

    #[async_trait]
    impl PriceHistoryProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, _symbol: &str, _range: DateRange) -> Result<Vec<PriceBar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.bars.clone())
        }
    }

    fn provider(bars: Vec<PriceBar>) -> Arc<CountingProvider> {
        Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            bars,
        })
    }

    fn bar() -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1,
        }
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("^gspc").unwrap(), "^GSPC");
        assert_eq!(normalize_symbol("").unwrap_err().kind(), "bad_request");
        assert_eq!(normalize_symbol("AA PL").unwrap_err().kind(), "bad_request");
    }

    #[tokio::test]
    async fn test_history_is_cached() {
        let provider = provider(vec![bar()]);
        let service = HistoryService::new(provider.clone(), Duration::from_secs(60));

        service.history("SPY", DateRange::all()).await.unwrap();
        service.history("SPY", DateRange::all()).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        service.invalidate("SPY");
        service.history("SPY", DateRange::all()).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_empty_history_is_no_data() {
        let provider = provider(Vec::new());
        let service = HistoryService::new(provider.clone(), Duration::from_secs(60));

        let err = tokio_test::block_on(service.history("SPY", DateRange::all())).unwrap_err();
        assert_eq!(err.kind(), "no_data");

        tokio_test::block_on(service.history("SPY", DateRange::all())).unwrap_err();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
