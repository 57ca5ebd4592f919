//! Per-ticker analysis pipeline: fetch, compute, classify, plan.
//!
//! Every failure mode is absorbed here and reported as a typed outcome so a
//! multi-ticker scan can never be aborted by one bad ticker.

use crate::services::cache::SeriesCache;
use crate::services::signals::classifier::{
    self, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD, VOLUME_WINDOW,
};
use crate::services::signals::indicators::{macd, rsi, volume};
use crate::services::signals::plan;
use crate::sources::provider::{PriceProvider, DAILY_PERIOD, WEEKLY_PERIOD};
use crate::types::{PriceSeries, SignalRecord, TrendStrength};
use std::sync::Arc;
use tracing::{debug, warn};

/// Exchange suffix appended for provider lookups and stripped from results.
const EXCHANGE_SUFFIX: &str = ".JK";

/// Sessions inspected for the volume baseline and day-over-day change.
const RECENT_WINDOW: usize = 21;

/// Why a ticker produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Provider returned an empty daily series.
    EmptySeries,
    /// Fewer than 2 of the last 21 daily sessions are available.
    InsufficientHistory,
    /// Provider fetch failed.
    Transport(String),
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmptySeries => "empty series",
            Self::InsufficientHistory => "insufficient history",
            Self::Transport(_) => "transport failure",
        }
    }
}

/// Outcome of analyzing one ticker. Callers branch on the discriminant.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Record(Box<SignalRecord>),
    Skipped(SkipReason),
}

/// Normalize a ticker to its provider symbol (suffix appended).
pub fn provider_symbol(ticker: &str) -> String {
    let t = ticker.trim().to_uppercase();
    if t.ends_with(EXCHANGE_SUFFIX) {
        t
    } else {
        format!("{}{}", t, EXCHANGE_SUFFIX)
    }
}

/// Normalize a ticker to its display identity (suffix stripped).
pub fn display_ticker(ticker: &str) -> String {
    let t = ticker.trim().to_uppercase();
    match t.strip_suffix(EXCHANGE_SUFFIX) {
        Some(stripped) => stripped.to_string(),
        None => t,
    }
}

/// Runs the full analysis for a single ticker.
pub struct TickerAnalyzer {
    provider: Arc<dyn PriceProvider>,
    cache: Arc<SeriesCache>,
}

impl TickerAnalyzer {
    pub fn new(provider: Arc<dyn PriceProvider>, cache: Arc<SeriesCache>) -> Self {
        Self { provider, cache }
    }

    /// Analyze one ticker. The exchange suffix is optional on input and
    /// absent from the returned record's identity.
    pub async fn analyze(&self, ticker: &str) -> AnalysisOutcome {
        let symbol = provider_symbol(ticker);
        let display_id = display_ticker(ticker);

        let daily = match self.fetch_daily(&symbol).await {
            Ok(series) => series,
            Err(message) => {
                warn!("Skipping {}: {}", display_id, message);
                return AnalysisOutcome::Skipped(SkipReason::Transport(message));
            }
        };

        if daily.is_empty() {
            return AnalysisOutcome::Skipped(SkipReason::EmptySeries);
        }

        let points = daily.points();
        let recent = &points[points.len() - points.len().min(RECENT_WINDOW)..];
        if recent.len() < 2 {
            return AnalysisOutcome::Skipped(SkipReason::InsufficientHistory);
        }

        let last = recent[recent.len() - 1];
        let prev = recent[recent.len() - 2];

        let Some((ath_price, ath_date)) = daily.all_time_high() else {
            return AnalysisOutcome::Skipped(SkipReason::EmptySeries);
        };

        let closes = daily.closes();
        let volumes = daily.volumes();

        let ath_distance_pct = classifier::ath_distance_pct(last.close, ath_price);

        let Some(baseline) = volume::baseline(&volumes, VOLUME_WINDOW) else {
            return AnalysisOutcome::Skipped(SkipReason::InsufficientHistory);
        };
        let vol_spike_ratio = classifier::vol_spike_ratio(last.volume, baseline);
        let price_change_pct = classifier::price_change_pct(prev.close, last.close);

        let rsi_value = rsi::rsi(&closes, RSI_PERIOD);
        let macd_out = macd::macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        let daily_up = classifier::daily_uptrend(&closes);
        let candle = classifier::classify_candle(&last);
        let plans = plan::trade_plans(last.close);

        // The weekly leg is independently guarded: losing it degrades the
        // trend to Unknown without failing the whole analysis.
        let weekly_up = match self.fetch_weekly(&symbol).await {
            Ok(weekly) => classifier::weekly_uptrend(&weekly),
            Err(message) => {
                debug!("Weekly series unavailable for {}: {}", display_id, message);
                None
            }
        };
        let trend_strength = TrendStrength::fuse(daily_up, weekly_up);

        AnalysisOutcome::Record(Box::new(SignalRecord {
            ticker: display_id,
            current_price: last.close,
            ath_price,
            ath_date,
            ath_distance_pct,
            vol_spike_ratio,
            price_change_pct,
            rsi: rsi_value,
            macd: macd_out.map(|m| m.line),
            macd_signal: macd_out.map(|m| m.signal),
            is_breakout: classifier::is_breakout(ath_distance_pct),
            is_volatile: classifier::is_volatile(vol_spike_ratio, price_change_pct),
            is_oversold: rsi_value.map(classifier::is_oversold).unwrap_or(false),
            is_golden_cross: macd_out.map(|m| m.is_golden_cross()).unwrap_or(false),
            is_uptrend: daily_up,
            is_weekly_uptrend: weekly_up.unwrap_or(false),
            trend_strength,
            is_doji: candle.is_doji,
            is_hammer: candle.is_hammer,
            plans,
        }))
    }

    async fn fetch_daily(&self, symbol: &str) -> std::result::Result<PriceSeries, String> {
        if let Some(series) = self.cache.get(symbol, "1d") {
            return Ok(series);
        }
        let series = self
            .provider
            .fetch_daily_series(symbol, DAILY_PERIOD)
            .await
            .map_err(|e| e.to_string())?;
        self.cache.insert(symbol, "1d", series.clone());
        Ok(series)
    }

    async fn fetch_weekly(&self, symbol: &str) -> std::result::Result<PriceSeries, String> {
        if let Some(series) = self.cache.get(symbol, "1wk") {
            return Ok(series);
        }
        let series = self
            .provider
            .fetch_weekly_series(symbol, WEEKLY_PERIOD)
            .await
            .map_err(|e| e.to_string())?;
        self.cache.insert(symbol, "1wk", series.clone());
        Ok(series)
    }
}
