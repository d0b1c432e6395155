pub mod cache;
pub mod calendar;
pub mod history;
pub mod indicators;
pub mod seasonal;
pub mod series;

pub use cache::HistoryCache;
pub use calendar::{FixedCalendar, NyseCalendar, TradingCalendar};
pub use history::{normalize_symbol, HistoryService};
pub use indicators::{IndicatorEngine, IndicatorSettings};
pub use seasonal::SeasonalAggregator;
