//! Price history provider seam.

use crate::error::Result;
use crate::types::PriceSeries;
use std::future::Future;
use std::pin::Pin;

/// Lookback requested for the daily series: the longest available history,
/// so the all-time high is computed over everything the provider has.
pub const DAILY_PERIOD: &str = "max";

/// Lookback requested for the weekly series used by the macro-trend check.
pub const WEEKLY_PERIOD: &str = "2y";

/// Source of daily and weekly OHLCV history for a ticker.
///
/// Implementations may fail on network or unknown-ticker conditions; those
/// failures surface as recoverable errors and are absorbed at the analyzer
/// boundary, never crashing a scan.
pub trait PriceProvider: Send + Sync {
    /// Fetch the daily series for `symbol` over the `period` lookback.
    fn fetch_daily_series<'a>(
        &'a self,
        symbol: &'a str,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries>> + Send + 'a>>;

    /// Fetch the weekly series for `symbol` over the `period` lookback.
    fn fetch_weekly_series<'a>(
        &'a self,
        symbol: &'a str,
        period: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries>> + Send + 'a>>;
}
