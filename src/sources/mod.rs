//! Price history providers.

pub mod finnhub;
pub mod yahoo;

pub use finnhub::FinnhubClient;
pub use yahoo::YahooFinanceClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{DateRange, PriceBar};

/// Source of daily OHLCV history for a symbol.
///
/// Implementations return bars in ascending date order, fail with
/// `NotFound` for unknown symbols and `Unavailable` for upstream failures.
/// An empty vector means the symbol exists but has no bars in `range`.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, symbol: &str, range: DateRange) -> Result<Vec<PriceBar>>;
}
